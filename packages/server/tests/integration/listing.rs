use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, Set};
use uuid::Uuid;

use partvault_server::entity::upload;

use crate::common::{TestApp, TestFile, routes};

fn two_files() -> Vec<TestFile> {
    vec![TestFile::new("a.pdf", b"a"), TestFile::new("b.pdf", b"b")]
}

fn part_numbers(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["part_number"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn manager_sees_all_owners_with_counts() {
    let app = TestApp::spawn().await;
    let upload_id = app
        .create_upload(&app.vendor_a_token(), "P-100", "Bracket", two_files())
        .await;
    app.create_upload(
        &app.vendor_b_token(),
        "Q-7",
        "Hinge",
        vec![TestFile::new("h.pdf", b"h")],
    )
    .await;

    let res = app.get_with_token(routes::UPLOADS, &app.manager_token()).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["pagination"]["total"], 2);

    let rows = res.body["data"].as_array().unwrap();
    let bracket = rows
        .iter()
        .find(|r| r["id"] == upload_id.to_string())
        .unwrap();
    assert_eq!(bracket["file_count"], 2);
    assert_eq!(bracket["owner_display_name"], "Alice Vendor");
    assert_eq!(bracket["owner_organization_name"], "Acme Machining");
    assert_eq!(bracket["owner_id"], app.principals.vendor_a.to_string());
}

#[tokio::test]
async fn vendor_sees_only_own_uploads() {
    let app = TestApp::spawn().await;
    app.create_upload(&app.vendor_a_token(), "A-1", "Mine", two_files())
        .await;
    app.create_upload(&app.vendor_b_token(), "B-1", "Theirs", two_files())
        .await;

    let res = app.get_with_token(routes::UPLOADS, &app.vendor_a_token()).await;
    assert_eq!(part_numbers(&res.body), vec!["A-1"]);

    // Asking for someone else's uploads still yields only one's own.
    let res = app
        .get_with_token(
            &format!("{}?owner_id={}", routes::UPLOADS, app.principals.vendor_b),
            &app.vendor_a_token(),
        )
        .await;
    assert_eq!(part_numbers(&res.body), vec!["A-1"]);
    for row in res.body["data"].as_array().unwrap() {
        assert_eq!(row["owner_id"], app.principals.vendor_a.to_string());
    }
}

#[tokio::test]
async fn part_number_and_owner_filters() {
    let app = TestApp::spawn().await;
    app.create_upload(&app.vendor_a_token(), "P-100", "Bracket", two_files())
        .await;
    let manager = app.manager_token();

    let res = app
        .get_with_token(&format!("{}?part_number=p-1", routes::UPLOADS), &manager)
        .await;
    assert_eq!(part_numbers(&res.body), vec!["P-100"]);
    assert_eq!(res.body["data"][0]["file_count"], 2);

    let res = app
        .get_with_token(
            &format!("{}?owner_id={}", routes::UPLOADS, app.principals.vendor_b),
            &manager,
        )
        .await;
    assert_eq!(res.body["pagination"]["total"], 0);

    let res = app
        .get_with_token(
            &format!(
                "{}?owner_id={}&part_number=100",
                routes::UPLOADS,
                app.principals.vendor_a
            ),
            &manager,
        )
        .await;
    assert_eq!(part_numbers(&res.body), vec!["P-100"]);
}

#[tokio::test]
async fn wildcards_in_search_match_literally() {
    let app = TestApp::spawn().await;
    let token = app.vendor_a_token();
    app.create_upload(&token, "AB_1", "Literal", two_files()).await;
    app.create_upload(&token, "ABX1", "Other", two_files()).await;

    let res = app
        .get_with_token(&format!("{}?part_number=b_", routes::UPLOADS), &token)
        .await;
    assert_eq!(part_numbers(&res.body), vec!["AB_1"]);

    let res = app
        .get_with_token(&format!("{}?part_number=%25", routes::UPLOADS), &token)
        .await;
    assert_eq!(res.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn newest_first() {
    let app = TestApp::spawn().await;
    let token = app.vendor_a_token();
    for pn in ["P-1", "P-2", "P-3"] {
        app.create_upload(&token, pn, "Part", vec![TestFile::new("f", b"f")])
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let res = app.get_with_token(routes::UPLOADS, &token).await;
    assert_eq!(part_numbers(&res.body), vec!["P-3", "P-2", "P-1"]);
}

#[tokio::test]
async fn same_timestamp_orders_by_id() {
    let app = TestApp::spawn().await;
    let created_at = Utc::now();

    let mut ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    for (i, id) in ids.iter().enumerate() {
        upload::Entity::insert(upload::ActiveModel {
            id: Set(*id),
            owner_id: Set(app.principals.vendor_a),
            part_number: Set(format!("T-{i}")),
            part_name: Set("Tie".into()),
            created_at: Set(created_at),
            ..Default::default()
        })
        .exec_without_returning(&app.db)
        .await
        .unwrap();
    }
    ids.sort();

    let res = app
        .get_with_token(routes::UPLOADS, &app.vendor_a_token())
        .await;
    let listed: Vec<String> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    assert_eq!(listed, expected);

    // Pages split the tie deterministically.
    let second = app
        .get_with_token(
            &format!("{}?page=2&per_page=1", routes::UPLOADS),
            &app.vendor_a_token(),
        )
        .await;
    assert_eq!(second.body["data"][0]["id"], expected[1]);
}

#[tokio::test]
async fn date_filters_are_whole_days() {
    let app = TestApp::spawn().await;
    app.create_upload(&app.vendor_a_token(), "P-100", "Bracket", two_files())
        .await;
    let manager = app.manager_token();

    let today = Utc::now().date_naive();
    let tomorrow = today + Duration::days(1);
    let yesterday = today - Duration::days(1);

    let total = |res: &crate::common::TestResponse| res.body["pagination"]["total"].as_u64().unwrap();

    let res = app
        .get_with_token(&format!("{}?date_from={tomorrow}", routes::UPLOADS), &manager)
        .await;
    assert_eq!(total(&res), 0);

    let res = app
        .get_with_token(&format!("{}?date_to={today}", routes::UPLOADS), &manager)
        .await;
    assert_eq!(total(&res), 1);

    let res = app
        .get_with_token(
            &format!("{}?date_from={today}&date_to={today}", routes::UPLOADS),
            &manager,
        )
        .await;
    assert_eq!(total(&res), 1);

    let res = app
        .get_with_token(&format!("{}?date_to={yesterday}", routes::UPLOADS), &manager)
        .await;
    assert_eq!(total(&res), 0);

    // Filter order does not matter.
    let a = app
        .get_with_token(
            &format!("{}?part_number=p-1&date_from={yesterday}", routes::UPLOADS),
            &manager,
        )
        .await;
    let b = app
        .get_with_token(
            &format!("{}?date_from={yesterday}&part_number=p-1", routes::UPLOADS),
            &manager,
        )
        .await;
    assert_eq!(a.body["data"], b.body["data"]);
    assert_eq!(total(&a), 1);
}

#[tokio::test]
async fn bad_filters_are_validation_errors() {
    let app = TestApp::spawn().await;
    let manager = app.manager_token();

    for query in [
        "date_from=2024-13-01",
        "date_from=2024-03-02&date_to=2024-03-01",
        "owner_id=not-a-uuid",
        "tz_offset_minutes=100000",
        "page=18446744073709551615",
        "page=9223372036854775807&per_page=2",
    ] {
        let res = app
            .get_with_token(&format!("{}?{query}", routes::UPLOADS), &manager)
            .await;
        assert_eq!(res.status, 400, "{query}: {}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn pagination_is_bounded() {
    let app = TestApp::spawn().await;
    let token = app.vendor_a_token();
    for i in 0..5 {
        app.create_upload(
            &token,
            &format!("P-{i}"),
            "Part",
            vec![TestFile::new("f", b"f")],
        )
        .await;
    }

    let res = app
        .get_with_token(&format!("{}?page=2&per_page=2", routes::UPLOADS), &token)
        .await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["pagination"]["page"], 2);
    assert_eq!(res.body["pagination"]["per_page"], 2);
    assert_eq!(res.body["pagination"]["total"], 5);
    assert_eq!(res.body["pagination"]["total_pages"], 3);

    let res = app
        .get_with_token(&format!("{}?per_page=100000", routes::UPLOADS), &token)
        .await;
    assert_eq!(res.body["pagination"]["per_page"], 100);
}
