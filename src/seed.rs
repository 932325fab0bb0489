//! Deterministic demo data for local runs (`TPO_SEED_DEMO=true`).
//!
//! Record counts and shapes mirror what the dashboard was prototyped against:
//! 50 students, 8 companies, 15 jobs, 100 applications and 3 announcements.
//! Values that would otherwise be random are derived from the record index so two
//! calls with the same `now` produce identical snapshots.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::entities::{
    Announcement, AnnouncementTarget, Application, ApplicationStatus, Branch, Company, Job,
    JobStatus, JobType, Student,
};
use crate::store::Snapshot;

const STUDENTS: usize = 50;
const JOBS: usize = 15;
const APPLICATIONS: usize = 100;

const FIRST_NAMES: [&str; 10] = [
    "Aarav", "Diya", "Ishaan", "Kavya", "Rohan", "Ananya", "Vikram", "Meera", "Arjun", "Sneha",
];
const LAST_NAMES: [&str; 5] = ["Sharma", "Iyer", "Reddy", "Nair", "Patel"];

const COMPANIES: [(&str, &str, &str); 8] = [
    ("Tech Corp", "Information Technology", "Bangalore"),
    ("InnoSoft Solutions", "Software Development", "Hyderabad"),
    ("DataSys Inc", "Data Analytics", "Pune"),
    ("CloudNet Systems", "Cloud Computing", "Mumbai"),
    ("AI Innovations", "Artificial Intelligence", "Bangalore"),
    ("CyberSec Pro", "Cybersecurity", "Chennai"),
    ("FinTech Solutions", "Financial Technology", "Gurgaon"),
    ("AutoMotive Tech", "Automotive", "Pune"),
];

const JOB_TITLES: [&str; 8] = [
    "Software Engineer",
    "Data Analyst",
    "Full Stack Developer",
    "DevOps Engineer",
    "Product Manager",
    "UI/UX Designer",
    "Machine Learning Engineer",
    "Backend Developer",
];

/// Stable ids: the high half tags the collection, the low half is the 1-based index.
fn seed_id(collection: u64, index: usize) -> Uuid {
    Uuid::from_u64_pair(0x7470_6f00_0000_0000 | collection, index as u64 + 1)
}

pub fn demo_snapshot() -> Snapshot {
    demo_snapshot_at(Utc::now())
}

pub fn demo_snapshot_at(now: DateTime<Utc>) -> Snapshot {
    let students = students(now);
    let companies = companies(now);
    let jobs = jobs(&companies, now);
    let applications = applications(&students, &jobs, now);
    let announcements = announcements(now);

    tracing::debug!(
        students = students.len(),
        companies = companies.len(),
        jobs = jobs.len(),
        applications = applications.len(),
        announcements = announcements.len(),
        "demo snapshot built"
    );

    Snapshot {
        students,
        companies,
        jobs,
        applications,
        announcements,
    }
}

fn students(now: DateTime<Utc>) -> Vec<Student> {
    (0..STUDENTS)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
            let created_at = now - Duration::days(30 + (i as i64 * 7) % 90);
            Student {
                id: seed_id(1, i),
                registration_number: format!("REG{}{:03}", 2020 + i % 4, i + 1),
                name: format!("{} {}", first, last),
                email: format!("{}.{}{}@university.edu", first.to_lowercase(), last.to_lowercase(), i + 1),
                phone: Some(format!("+91 98{:08}", (i * 7_919_993) % 100_000_000)),
                branch: Branch::ALL[i % Branch::ALL.len()],
                year: (i % 4) as u8 + 1,
                // 6.00 to 9.98 in steps that do not repeat for the first 50 records.
                // Built from whole hundredths so the value survives a JSON round trip.
                cgpa: (600 + ((i * 37) % 200) * 2) as f64 / 100.0,
                // roughly 70% complete
                profile_completed: i % 10 >= 3,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

fn companies(now: DateTime<Utc>) -> Vec<Company> {
    COMPANIES
        .iter()
        .enumerate()
        .map(|(i, (name, industry, location))| {
            let slug: String = name.to_lowercase().split_whitespace().collect();
            let created_at = now - Duration::days(60 + i as i64 * 11);
            Company {
                id: seed_id(2, i),
                name: name.to_string(),
                description: format!(
                    "{} is a leading company in {}. We are committed to innovation and excellence.",
                    name, industry
                ),
                website: Some(format!("https://www.{}.com", slug)),
                industry: industry.to_string(),
                location: location.to_string(),
                email: Some(format!("careers@{}.com", slug)),
                phone: None,
                address: None,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

fn jobs(companies: &[Company], now: DateTime<Utc>) -> Vec<Job> {
    (0..JOBS)
        .map(|i| {
            let company = &companies[i % companies.len()];
            let title = JOB_TITLES[i % JOB_TITLES.len()];
            let created_at = now - Duration::days(5 + (i as i64 * 3) % 50);
            Job {
                id: seed_id(3, i),
                company_id: company.id,
                company_name: company.name.clone(),
                title: title.to_string(),
                description: format!("We are looking for a talented {} to join our dynamic team.", title),
                requirements: "Bachelor's degree in relevant field, Strong problem-solving skills, Good communication"
                    .to_string(),
                salary: format!("₹{:.1} LPA", 6.0 + ((i * 13) % 140) as f64 / 10.0),
                location: company.location.clone(),
                job_type: if i % 5 == 4 { JobType::Internship } else { JobType::FullTime },
                status: if i % 3 == 0 { JobStatus::Closed } else { JobStatus::Open },
                deadline: (now + Duration::days(1 + (i as i64 * 2) % 30)).date_naive(),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

fn applications(students: &[Student], jobs: &[Job], now: DateTime<Utc>) -> Vec<Application> {
    (0..APPLICATIONS)
        .map(|i| {
            let student = &students[i % students.len()];
            let job = &jobs[i % jobs.len()];
            let applied_at = now - Duration::hours(12 + (i as i64 * 17) % 800);
            Application {
                id: seed_id(4, i),
                job_id: Some(job.id),
                student_id: student.id,
                student_name: student.name.clone(),
                job_title: job.title.clone(),
                company_name: job.company_name.clone(),
                status: ApplicationStatus::ALL[i % ApplicationStatus::ALL.len()],
                applied_at,
                updated_at: applied_at + Duration::hours((i % 48) as i64),
            }
        })
        .collect()
}

fn announcements(now: DateTime<Utc>) -> Vec<Announcement> {
    let entries = [
        (
            "Campus Placement Drive 2025",
            "The campus placement drive for the year 2025 will commence from January 15th. All eligible students are requested to update their profiles.",
            AnnouncementTarget::All,
            None,
            2,
        ),
        (
            "Resume Workshop for CSE Students",
            "A resume building workshop will be conducted for all CSE students on December 20th at 2 PM in the seminar hall.",
            AnnouncementTarget::Branch,
            Some("CSE"),
            5,
        ),
        (
            "Important Notice for Final Year",
            "All final year students must complete their profile verification by December 30th to be eligible for upcoming placements.",
            AnnouncementTarget::Batch,
            Some("4"),
            7,
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (title, content, target, value, days_ago))| {
            let created_at = now - Duration::days(days_ago);
            Announcement {
                id: seed_id(5, i),
                title: title.to_string(),
                content: content.to_string(),
                target,
                target_value: value.map(str::to_string),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}
