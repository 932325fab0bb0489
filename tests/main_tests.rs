use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tpo_admin::entities::{
    ApplicationStatus, Branch, JobStatus, JobType, NewApplication, NewCompany, NewJob, NewStudent,
    StudentPatch,
};
use tpo_admin::filter::{ApplicationFilter, StudentFilter};
use tpo_admin::{create_app, seed, ApiClient, AppError, AppState, DataSource, Store};
use tracing::Level;

const TOKEN: &str = "main-test-token";

/// Serves the app on an ephemeral local port and returns its base URL.
async fn start_server(store: Store) -> (String, JoinHandle<()>) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .try_init();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(AppState::new(store).with_admin_token(TOKEN));
    let server_task: JoinHandle<()> = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    tracing::info!("Test server running on http://{}", addr);
    (format!("http://{}", addr), server_task)
}

#[tokio::test]
async fn test_main_server_startup() {
    let (url, server_task) = start_server(Store::new()).await;

    let client = ApiClient::new(&url).unwrap();
    let health = client.health().await;

    server_task.abort();
    assert_eq!(health.unwrap(), "Service is healthy");
}

#[tokio::test]
async fn test_client_round_trip_against_server() {
    let (url, server_task) = start_server(Store::new()).await;
    let client = ApiClient::new(&url).unwrap().with_token(TOKEN);

    let student = client
        .create_student(&NewStudent {
            registration_number: "CS2021001".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha.rao@college.edu".to_string(),
            phone: Some("+91 98765 43210".to_string()),
            branch: Branch::Cse,
            year: 4,
            cgpa: 8.7,
            profile_completed: true,
        })
        .await
        .unwrap();
    let company = client
        .create_company(&NewCompany {
            name: "Acme".to_string(),
            description: "Campus hiring partner for software roles".to_string(),
            website: None,
            industry: "Software".to_string(),
            location: "Pune".to_string(),
            email: Some("hr@acme.example.com".to_string()),
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    let job = client
        .create_job(&NewJob {
            company_id: company.id.to_string(),
            title: "Backend Engineer".to_string(),
            description: "Own the services behind the placement portal".to_string(),
            requirements: "Comfortable with Rust and PostgreSQL".to_string(),
            salary: "18 LPA".to_string(),
            location: "Pune".to_string(),
            job_type: JobType::FullTime,
            status: None,
            deadline: "2030-03-31".to_string(),
        })
        .await
        .unwrap();
    let application = client
        .create_application(&NewApplication {
            job_id: job.id,
            student_id: student.id,
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(application.company_name, "Acme");

    client
        .update_student(
            student.id,
            &StudentPatch {
                name: Some("Asha Menon".to_string()),
                ..StudentPatch::default()
            },
        )
        .await
        .unwrap();
    let moved = client
        .set_application_status(application.id, ApplicationStatus::Shortlisted)
        .await
        .unwrap();
    assert_eq!(moved.student_name, "Asha Menon");
    assert_eq!(moved.status, ApplicationStatus::Shortlisted);

    let closed = client.set_job_status(job.id, JobStatus::Closed).await.unwrap();
    assert_eq!(closed.status, JobStatus::Closed);

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_students, 1);
    assert_eq!(stats.active_jobs, 0);
    assert_eq!(stats.pending_applications, 0);

    let groups = client.grouped_applications(&ApplicationFilter::default()).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].job_id, Some(job.id));

    let analytics = client.job_analytics(job.id).await.unwrap();
    assert_eq!(analytics.shortlisted, 1);

    client.delete_application(application.id).await.unwrap();
    let missing = client.get_application(application.id).await;

    server_task.abort();
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_client_surfaces_server_errors() {
    let (url, server_task) = start_server(Store::new()).await;
    let anonymous = ApiClient::new(&url).unwrap();
    let admin = ApiClient::new(&url).unwrap().with_token(TOKEN);

    let unauthorized = anonymous
        .create_company(&NewCompany {
            name: "Acme".to_string(),
            description: "Campus hiring partner for software roles".to_string(),
            website: None,
            industry: "Software".to_string(),
            location: "Pune".to_string(),
            email: None,
            phone: None,
            address: None,
        })
        .await;

    let invalid = admin
        .create_company(&NewCompany {
            name: "A".to_string(),
            description: "short".to_string(),
            website: Some("ftp://acme".to_string()),
            industry: "Software".to_string(),
            location: "Pune".to_string(),
            email: None,
            phone: None,
            address: None,
        })
        .await;

    let filtered = admin
        .list_students(&StudentFilter {
            search: Some("nobody".to_string()),
            branch: Some(Branch::Ece),
            year: Some(2),
        })
        .await;

    server_task.abort();

    assert!(matches!(unauthorized, Err(AppError::Unauthorized(_))));
    match invalid {
        Err(AppError::Validation(fields)) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["name", "description", "website"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(filtered.unwrap().is_empty());
}

#[tokio::test]
async fn test_both_data_sources_agree() {
    let snapshot = seed::demo_snapshot();
    let local = Store::with_snapshot(snapshot.clone());
    let (url, server_task) = start_server(Store::with_snapshot(snapshot)).await;
    let remote = ApiClient::new(&url).unwrap();

    let sources: Vec<Box<dyn DataSource>> = vec![Box::new(local), Box::new(remote)];
    let mut loaded = Vec::new();
    for source in &sources {
        loaded.push(source.load_snapshot().await);
    }

    server_task.abort();
    let remote = loaded.pop().unwrap().unwrap();
    let local = loaded.pop().unwrap().unwrap();
    assert_eq!(local, remote);
}

#[tokio::test]
async fn test_client_gives_up_when_server_is_down() {
    // Bind and drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::with_timeout(&format!("http://{}", addr), Duration::from_secs(1))
        .unwrap()
        .with_retry_budget(Duration::from_millis(300));
    let result = client.dashboard_stats().await;
    assert!(matches!(result, Err(AppError::Upstream(_))));
}
