use tpo_admin::entities::{
    AnnouncementPatch, AnnouncementTarget, ApplicationStatus, Branch, CompanyPatch, JobPatch,
    JobStatus, JobType, NewAnnouncement, NewApplication, NewCompany, NewJob, NewStudent,
    StudentPatch,
};
use tpo_admin::filter::{ApplicationFilter, StudentFilter};
use tpo_admin::store::{Change, Collection};
use tpo_admin::{AppError, DataSource, Store};
use uuid::Uuid;

fn new_student(reg: &str, name: &str) -> NewStudent {
    NewStudent {
        registration_number: reg.to_string(),
        name: name.to_string(),
        email: format!("{}@college.edu", reg.to_lowercase()),
        phone: None,
        branch: Branch::Cse,
        year: 3,
        cgpa: 8.1,
        profile_completed: true,
    }
}

fn new_company(name: &str) -> NewCompany {
    NewCompany {
        name: name.to_string(),
        description: "Builds software for campuses".to_string(),
        website: Some("https://example.com".to_string()),
        industry: "Software".to_string(),
        location: "Bangalore".to_string(),
        email: None,
        phone: None,
        address: None,
    }
}

fn new_job(company_id: Uuid, title: &str) -> NewJob {
    NewJob {
        company_id: company_id.to_string(),
        title: title.to_string(),
        description: "Work on the placement portal".to_string(),
        requirements: "Rust, SQL and good communication".to_string(),
        salary: "12 LPA".to_string(),
        location: "Bangalore".to_string(),
        job_type: JobType::FullTime,
        status: None,
        deadline: "2030-06-30".to_string(),
    }
}

#[tokio::test]
async fn test_create_puts_newest_first() {
    let store = Store::new();
    store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();
    store.create_student(new_student("CS002", "Ravi Kumar")).await.unwrap();

    let students = store.list_students(&StudentFilter::default()).await;
    assert_eq!(students[0].name, "Ravi Kumar");
    assert_eq!(students[1].name, "Asha Rao");
}

#[tokio::test]
async fn test_duplicate_registration_number_conflicts() {
    let store = Store::new();
    let first = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();

    let err = store
        .create_student(new_student("cs001", "Ravi Kumar"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Keeping your own number on update is fine.
    let patch = StudentPatch {
        registration_number: Some("CS001".to_string()),
        ..StudentPatch::default()
    };
    assert!(store.update_student(first.id, patch).await.is_ok());
}

#[tokio::test]
async fn test_invalid_student_is_rejected_with_field_errors() {
    let store = Store::new();
    let mut input = new_student("CS001", "A");
    input.year = 7;
    match store.create_student(input).await {
        Err(AppError::Validation(fields)) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert!(names.contains(&"name"));
            assert!(names.contains(&"year"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(store.snapshot().await.students.is_empty());
}

#[tokio::test]
async fn test_job_requires_existing_company() {
    let store = Store::new();
    let err = store.create_job(new_job(Uuid::new_v4(), "SDE")).await.unwrap_err();
    match err {
        AppError::Validation(fields) => assert_eq!(fields[0].field, "companyId"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_application_copies_names_and_defaults_to_applied() {
    let store = Store::new();
    let student = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();
    let company = store.create_company(new_company("Acme")).await.unwrap();
    let job = store.create_job(new_job(company.id, "SDE")).await.unwrap();
    assert_eq!(job.company_name, "Acme");
    assert_eq!(job.status, JobStatus::Open);

    let app = store
        .create_application(NewApplication {
            job_id: job.id,
            student_id: student.id,
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Applied);
    assert_eq!(app.student_name, "Asha Rao");
    assert_eq!(app.job_title, "SDE");
    assert_eq!(app.company_name, "Acme");

    let err = store
        .create_application(NewApplication {
            job_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            status: None,
        })
        .await
        .unwrap_err();
    match err {
        AppError::Validation(fields) => assert_eq!(fields.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_renames_cascade_to_applications() {
    let store = Store::new();
    let student = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();
    let company = store.create_company(new_company("Acme")).await.unwrap();
    let other = store.create_company(new_company("Globex")).await.unwrap();
    let job = store.create_job(new_job(company.id, "SDE")).await.unwrap();
    let app = store
        .create_application(NewApplication {
            job_id: job.id,
            student_id: student.id,
            status: None,
        })
        .await
        .unwrap();

    store
        .update_student(
            student.id,
            StudentPatch {
                name: Some("Asha Menon".to_string()),
                ..StudentPatch::default()
            },
        )
        .await
        .unwrap();
    store
        .update_company(
            company.id,
            CompanyPatch {
                name: Some("Acme Labs".to_string()),
                ..CompanyPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.get_job(job.id).await.unwrap().company_name, "Acme Labs");

    store
        .update_job(
            job.id,
            JobPatch {
                title: Some("Backend Engineer".to_string()),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap();

    let app = store.get_application(app.id).await.unwrap();
    assert_eq!(app.student_name, "Asha Menon");
    assert_eq!(app.company_name, "Acme Labs");
    assert_eq!(app.job_title, "Backend Engineer");

    // Moving the job to another company carries its applications along.
    store
        .update_job(
            job.id,
            JobPatch {
                company_id: Some(other.id.to_string()),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.get_application(app.id).await.unwrap().company_name, "Globex");
}

#[tokio::test]
async fn test_any_status_transition_is_allowed() {
    let store = Store::new();
    let student = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();
    let company = store.create_company(new_company("Acme")).await.unwrap();
    let job = store.create_job(new_job(company.id, "SDE")).await.unwrap();
    let app = store
        .create_application(NewApplication {
            job_id: job.id,
            student_id: student.id,
            status: Some(ApplicationStatus::Rejected),
        })
        .await
        .unwrap();

    let updated = store
        .set_application_status(app.id, ApplicationStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Accepted);
    assert!(updated.updated_at >= app.updated_at);

    let back = store
        .set_application_status(app.id, ApplicationStatus::Applied)
        .await
        .unwrap();
    assert_eq!(back.status, ApplicationStatus::Applied);
}

#[tokio::test]
async fn test_deletes_do_not_cascade() {
    let store = Store::new();
    let student = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();
    let company = store.create_company(new_company("Acme")).await.unwrap();
    let job = store.create_job(new_job(company.id, "SDE")).await.unwrap();
    store
        .create_application(NewApplication {
            job_id: job.id,
            student_id: student.id,
            status: None,
        })
        .await
        .unwrap();

    store.delete_company(company.id).await.unwrap();
    store.delete_job(job.id).await.unwrap();
    store.delete_student(student.id).await.unwrap();

    let apps = store.list_applications(&ApplicationFilter::for_job(job.id)).await;
    assert_eq!(apps.len(), 1);
    assert!(matches!(
        store.delete_job(job.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_announcement_audience() {
    let store = Store::new();
    let student = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();

    store
        .create_announcement(NewAnnouncement {
            title: "Placement drive".to_string(),
            content: "All students should update their profiles.".to_string(),
            target: AnnouncementTarget::All,
            target_value: None,
        })
        .await
        .unwrap();
    store
        .create_announcement(NewAnnouncement {
            title: "CSE workshop".to_string(),
            content: "Resume workshop in the seminar hall.".to_string(),
            target: AnnouncementTarget::Branch,
            target_value: Some("cse".to_string()),
        })
        .await
        .unwrap();
    let batch = store
        .create_announcement(NewAnnouncement {
            title: "Final years".to_string(),
            content: "Verification closes on Friday evening.".to_string(),
            target: AnnouncementTarget::Batch,
            target_value: Some("4".to_string()),
        })
        .await
        .unwrap();

    let visible = store.announcements_for_student(student.id).await.unwrap();
    let titles: Vec<&str> = visible.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["CSE workshop", "Placement drive"]);

    // Retargeting to the student's year makes it visible.
    store
        .update_announcement(
            batch.id,
            AnnouncementPatch {
                target_value: Some("3".to_string()),
                ..AnnouncementPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.announcements_for_student(student.id).await.unwrap().len(), 3);

    // Switching to BRANCH without a branch value is rejected.
    let err = store
        .update_announcement(
            batch.id,
            AnnouncementPatch {
                target: Some(AnnouncementTarget::Branch),
                ..AnnouncementPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_subscribers_see_changes() {
    let store = Store::new();
    let mut events = store.subscribe();

    let student = store.create_student(new_student("CS001", "Asha Rao")).await.unwrap();
    let event = events.recv().await.unwrap();
    assert_eq!(event.collection, Collection::Students);
    assert_eq!(event.change, Change::Created);
    assert_eq!(event.id, Some(student.id));

    store.delete_student(student.id).await.unwrap();
    let event = events.recv().await.unwrap();
    assert_eq!(event.change, Change::Deleted);

    store.set_students(Vec::new()).await;
    let event = events.recv().await.unwrap();
    assert_eq!(event.change, Change::Replaced);
    assert_eq!(event.id, None);
}

#[tokio::test]
async fn test_store_is_a_data_source() {
    let store = Store::with_snapshot(tpo_admin::seed::demo_snapshot());
    let source: &dyn DataSource = &store;
    let snapshot = source.load_snapshot().await.unwrap();
    assert_eq!(snapshot, store.snapshot().await);
    assert_eq!(snapshot.students.len(), 50);
}

#[tokio::test]
async fn test_whole_collections_can_be_swapped() {
    let demo = tpo_admin::seed::demo_snapshot();
    let store = Store::new();
    let mut events = store.subscribe();

    store.replace(demo.clone()).await;
    let mut replaced = Vec::new();
    for _ in 0..5 {
        let event = events.recv().await.unwrap();
        assert_eq!(event.change, Change::Replaced);
        replaced.push(event.collection);
    }
    assert_eq!(
        replaced,
        vec![
            Collection::Students,
            Collection::Companies,
            Collection::Jobs,
            Collection::Applications,
            Collection::Announcements,
        ]
    );
    assert_eq!(store.snapshot().await, demo);

    store.set_companies(demo.companies[..2].to_vec()).await;
    store.set_jobs(demo.jobs[..3].to_vec()).await;
    store.set_applications(Vec::new()).await;
    store.set_announcements(demo.announcements[..1].to_vec()).await;

    for expected in [
        Collection::Companies,
        Collection::Jobs,
        Collection::Applications,
        Collection::Announcements,
    ] {
        let event = events.recv().await.unwrap();
        assert_eq!(event.collection, expected);
        assert_eq!(event.change, Change::Replaced);
        assert_eq!(event.id, None);
    }

    let (students, companies, jobs, applications, announcements) = store
        .read(|s| {
            (
                s.students.len(),
                s.companies.len(),
                s.jobs.len(),
                s.applications.len(),
                s.announcements.len(),
            )
        })
        .await;
    assert_eq!((students, companies, jobs, applications, announcements), (50, 2, 3, 0, 1));
}
