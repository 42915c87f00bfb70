use crate::common::{Role, TestApp, TestFile, routes};

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::UPLOADS).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "TOKEN_MISSING");

    let res = app
        .submit(None, Some("P-1"), Some("Part"), vec![TestFile::new("a.txt", b"a")])
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn malformed_and_forged_tokens_are_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_with_token(routes::UPLOADS, "not-a-jwt").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "TOKEN_INVALID");

    let forged = partvault_server::utils::jwt::sign(
        "some-other-secret",
        app.principals.manager,
        Role::Manager,
        chrono::Duration::hours(1),
    )
    .unwrap();
    let res = app.get_with_token(routes::UPLOADS, &forged).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "TOKEN_INVALID");
}

#[tokio::test]
async fn me_returns_catalog_record() {
    let app = TestApp::spawn().await;

    let res = app.get_with_token(routes::ME, &app.vendor_a_token()).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.uuid("id"), app.principals.vendor_a);
    assert_eq!(res.body["role"], "vendor");
    assert_eq!(res.body["organization_name"], "Acme Machining");

    let res = app.get_with_token(routes::ME, &app.manager_token()).await;
    assert_eq!(res.body["role"], "manager");
    assert!(res.body["organization_name"].is_null());
}

#[tokio::test]
async fn me_for_unknown_principal_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.token_for(uuid::Uuid::now_v7(), Role::Vendor);

    let res = app.get_with_token(routes::ME, &token).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}

#[tokio::test]
async fn manager_cannot_submit() {
    let app = TestApp::spawn().await;

    let res = app
        .submit(
            Some(&app.manager_token()),
            Some("P-1"),
            Some("Part"),
            vec![TestFile::new("a.txt", b"a")],
        )
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.code(), "PERMISSION_DENIED");
}

#[tokio::test]
async fn token_role_must_match_catalog_role() {
    let app = TestApp::spawn().await;
    // Vendor claim for a principal the catalog records as a manager.
    let token = app.token_for(app.principals.manager, Role::Vendor);

    let res = app
        .submit(
            Some(&token),
            Some("P-1"),
            Some("Part"),
            vec![TestFile::new("a.txt", b"a")],
        )
        .await;
    assert_eq!(res.status, 403);

    let res = app.get_with_token(routes::UPLOADS, &app.manager_token()).await;
    assert_eq!(res.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn vendor_directory_is_manager_only() {
    let app = TestApp::spawn().await;

    let res = app.get_with_token(routes::VENDORS, &app.vendor_a_token()).await;
    assert_eq!(res.status, 403);
    assert_eq!(res.code(), "PERMISSION_DENIED");

    let res = app.get_with_token(routes::INCOMPLETE, &app.vendor_a_token()).await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn vendor_directory_sorted_by_organization() {
    let app = TestApp::spawn().await;
    app.insert_principal(Role::Vendor, "Zed", Some("Aardvark Tooling"))
        .await;

    let res = app.get_with_token(routes::VENDORS, &app.manager_token()).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total"], 3);

    let orgs: Vec<&str> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["organization_name"].as_str().unwrap())
        .collect();
    assert_eq!(orgs, vec!["Aardvark Tooling", "Acme Machining", "Bolt Works"]);
}
