mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{db_app, request, send, token, TestDb};
use jobly_api::database::models::{Company, CompanyFilter, Job, JobFilter, NewCompany};
use jobly_api::database::UpdatePayload;
use jobly_api::error::ApiError;

fn handles(companies: &[Company]) -> Vec<&str> {
    companies.iter().map(|c| c.handle.as_str()).collect()
}

fn new_company() -> NewCompany {
    NewCompany {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: Some("http://new.img".into()),
    }
}

#[tokio::test]
async fn create_works_and_rejects_duplicates() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };

    let company = Company::create(&db.pool, new_company()).await?;
    assert_eq!(company.handle, "new");
    assert_eq!(company.num_employees, Some(1));

    let err = Company::create(&db.pool, new_company()).await.unwrap_err();
    assert_eq!(err, ApiError::conflict("Duplicate company: new"));

    let same_name = NewCompany { handle: "other".into(), ..new_company() };
    let err = Company::create(&db.pool, same_name).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn find_all_applies_filters() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };

    let cases: Vec<(CompanyFilter, Vec<&str>)> = vec![
        (CompanyFilter::default(), vec!["c1", "c2", "c3"]),
        (CompanyFilter { name_like: Some("1".into()), ..Default::default() }, vec!["c1"]),
        (CompanyFilter { min_employees: Some(2), ..Default::default() }, vec!["c2", "c3"]),
        (CompanyFilter { max_employees: Some(2), ..Default::default() }, vec!["c1", "c2"]),
        (
            CompanyFilter { min_employees: Some(2), max_employees: Some(2), ..Default::default() },
            vec!["c2"],
        ),
    ];

    for (filter, expected) in cases {
        let companies = Company::find_all(&db.pool, &filter).await?;
        assert_eq!(handles(&companies), expected, "{:?}", filter);
    }

    let inverted = CompanyFilter { min_employees: Some(3), max_employees: Some(1), ..Default::default() };
    assert!(matches!(
        Company::find_all(&db.pool, &inverted).await,
        Err(ApiError::BadRequest(_))
    ));
    Ok(())
}

#[tokio::test]
async fn get_includes_jobs() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };

    let detail = Company::get(&db.pool, "c1").await?;
    assert_eq!(detail.company.name, "C1");
    assert_eq!(detail.jobs.len(), 1);
    assert_eq!(detail.jobs[0].title, "J1");

    let err = Company::get(&db.pool, "nope").await.unwrap_err();
    assert_eq!(err, ApiError::not_found("No company: nope"));
    Ok(())
}

#[tokio::test]
async fn update_uses_column_aliases() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };

    let payload = UpdatePayload::new()
        .with("numEmployees", 10)
        .with("logoUrl", Value::Null);
    let company = Company::update(&db.pool, "c1", payload).await?;

    assert_eq!(company.num_employees, Some(10));
    assert_eq!(company.logo_url, None);
    assert_eq!(company.name, "C1");

    let err = Company::update(&db.pool, "c1", UpdatePayload::new().with("name", "C2"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::conflict("Duplicate company: C2"));

    let err = Company::update(&db.pool, "nope", UpdatePayload::new().with("name", "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn remove_cascades_to_jobs() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };

    Company::remove(&db.pool, "c1").await?;
    assert!(matches!(Company::get(&db.pool, "c1").await, Err(ApiError::NotFound(_))));

    let jobs = Job::find_all(&db.pool, &JobFilter::default()).await?;
    assert!(jobs.iter().all(|j| j.company != "c1"));

    assert!(matches!(Company::remove(&db.pool, "c1").await, Err(ApiError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn http_create_and_list() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };
    let app = db_app(db.pool.clone())?;

    let body = json!({
        "handle": "new",
        "name": "New",
        "description": "New Description",
        "numEmployees": 1,
        "logoUrl": "http://new.img"
    });

    let (status, _) = send(
        &app,
        request(Method::POST, "/companies", Some(&token("u1", false)), Some(body.clone())),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = send(
        &app,
        request(Method::POST, "/companies", Some(&token("admin", true)), Some(body)),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["numEmployees"], 1);

    let (status, listed) =
        send(&app, request(Method::GET, "/companies?nameLike=new", None, None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"][0]["handle"], "new");

    let (status, user) =
        send(&app, request(Method::GET, "/users/u1", Some(&token("u1", false)), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["data"]["email"], "user1@user.com");
    Ok(())
}

#[tokio::test]
async fn http_create_rejects_bad_handles() -> Result<()> {
    let Some(db) = TestDb::acquire().await? else { return Ok(()) };
    let app = db_app(db.pool.clone())?;
    let admin = token("admin", true);

    let cases = [
        ("x".repeat(30), "handle must be at most 25 characters"),
        ("UPPER".to_string(), "handle must be lowercase"),
    ];

    for (handle, message) in cases {
        let body = json!({
            "handle": handle,
            "name": "Bad Handle",
            "description": "Desc"
        });
        let (status, response) =
            send(&app, request(Method::POST, "/companies", Some(&admin), Some(body))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", response);
        assert_eq!(response["message"], message);
    }

    let companies = Company::find_all(&db.pool, &CompanyFilter::default()).await?;
    assert_eq!(handles(&companies), vec!["c1", "c2", "c3"]);
    Ok(())
}
