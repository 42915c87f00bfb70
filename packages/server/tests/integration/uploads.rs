use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use partvault_server::catalog::storage_key::MAX_NAME_BYTES;
use partvault_server::entity::ingestion_intent::{self, IngestionStatus};
use partvault_server::entity::{file_asset, upload};

use crate::common::{TestApp, TestFile, routes};

#[tokio::test]
async fn vendor_submits_part_with_files() {
    let app = TestApp::spawn().await;

    let res = app
        .submit(
            Some(&app.vendor_a_token()),
            Some("  P-100 "),
            Some("Bracket"),
            vec![
                TestFile::with_mime("drawing v1.pdf", &[7u8; 1024], "application/pdf"),
                TestFile::new("model.step", b"ISO-10303-21;"),
            ],
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["file_count"], 2);
    let upload_id = res.uuid("id");

    let row = upload::Entity::find_by_id(upload_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("upload row");
    assert_eq!(row.owner_id, app.principals.vendor_a);
    assert_eq!(row.part_number, "P-100");

    let files = file_asset::Entity::find()
        .filter(file_asset::Column::UploadId.eq(upload_id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(files.len(), 2);
    for file in &files {
        assert!(file.storage_key.starts_with(&format!("{upload_id}/")));
    }

    let pdf = files.iter().find(|f| f.file_name == "drawing v1.pdf").unwrap();
    assert_eq!(pdf.size_bytes, 1024);
    assert_eq!(pdf.mime_type, "application/pdf");
    assert_eq!(pdf.content_hash.len(), 64);

    let intent = ingestion_intent::Entity::find_by_id(upload_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("intent row");
    assert_eq!(intent.status, IngestionStatus::Completed);
    assert_eq!(intent.expected_files, 2);
    assert!(intent.finished_at.is_some());
}

#[tokio::test]
async fn mime_type_falls_back_to_extension() {
    let app = TestApp::spawn().await;
    let upload_id = app
        .create_upload(
            &app.vendor_a_token(),
            "P-1",
            "Plate",
            vec![
                TestFile::new("photo.png", b"PNG"),
                TestFile::new("mystery.zzunknown", b"???"),
            ],
        )
        .await;

    let res = app
        .get_with_token(&routes::upload(upload_id), &app.vendor_a_token())
        .await;
    let files = res.body["files"].as_array().unwrap();
    let mime_of = |name: &str| {
        files
            .iter()
            .find(|f| f["file_name"] == name)
            .map(|f| f["mime_type"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(mime_of("photo.png"), "image/png");
    assert_eq!(mime_of("mystery.zzunknown"), "");
}

#[tokio::test]
async fn identical_file_names_get_distinct_keys() {
    let app = TestApp::spawn().await;
    let upload_id = app
        .create_upload(
            &app.vendor_a_token(),
            "P-2",
            "Shim",
            vec![
                TestFile::new("part.step", b"first"),
                TestFile::new("part.step", b"second"),
                TestFile::new("part.step", b"third"),
            ],
        )
        .await;

    let files = file_asset::Entity::find()
        .filter(file_asset::Column::UploadId.eq(upload_id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(files.len(), 3);

    let mut keys: Vec<_> = files.iter().map(|f| f.storage_key.clone()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 3);
    assert!(files.iter().all(|f| f.file_name == "part.step"));
}

#[tokio::test]
async fn validation_rejects_before_any_write() {
    let app = TestApp::spawn().await;
    let token = app.vendor_a_token();

    let cases = vec![
        app.submit(Some(&token), None, Some("Bracket"), vec![TestFile::new("a", b"a")])
            .await,
        app.submit(Some(&token), Some("   "), Some("Bracket"), vec![TestFile::new("a", b"a")])
            .await,
        app.submit(Some(&token), Some("P-1"), Some(""), vec![TestFile::new("a", b"a")])
            .await,
        app.submit(Some(&token), Some("P-1"), Some("Bracket"), vec![]).await,
        app.submit(
            Some(&token),
            Some("P-1"),
            Some("Bracket"),
            (0..6).map(|_| TestFile::new("f.bin", b"x")).collect(),
        )
        .await,
    ];

    for res in cases {
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    assert_eq!(upload::Entity::find().all(&app.db).await.unwrap().len(), 0);
    assert_eq!(file_asset::Entity::find().all(&app.db).await.unwrap().len(), 0);
}

#[tokio::test]
async fn long_file_names_are_checked_before_any_write() {
    let app = TestApp::spawn().await;
    let token = app.vendor_a_token();

    let too_long = format!("{}.pdf", "a".repeat(246));
    let res = app
        .submit(
            Some(&token),
            Some("P-1"),
            Some("Bracket"),
            vec![TestFile::new(too_long, b"a")],
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.code(), "VALIDATION_ERROR");
    assert_eq!(upload::Entity::find().all(&app.db).await.unwrap().len(), 0);

    // 60 four-byte characters: short in characters, long in bytes.
    let wide = "\u{1F529}".repeat(60);
    let res = app
        .submit(Some(&token), Some("P-1"), Some("Bracket"), vec![TestFile::new(wide, b"a")])
        .await;
    assert_eq!(res.status, 400, "{}", res.text);

    let longest = format!("{}.pdf", "b".repeat(MAX_NAME_BYTES - 4));
    let res = app
        .submit(
            Some(&token),
            Some("P-2"),
            Some("Bracket"),
            vec![TestFile::new(longest.clone(), b"kept")],
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let files = file_asset::Entity::find()
        .filter(file_asset::Column::UploadId.eq(res.uuid("id")))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, longest);
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .submit(
            Some(&app.vendor_a_token()),
            Some("P-1"),
            Some("Big"),
            vec![TestFile::new("big.bin", &vec![0u8; 1024 * 1024 + 1])],
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert!(res.body["message"].as_str().unwrap().contains("big.bin"));
}

#[tokio::test]
async fn resubmission_creates_new_upload() {
    let app = TestApp::spawn().await;
    let token = app.vendor_a_token();

    let first = app
        .create_upload(&token, "P-1", "Bracket", vec![TestFile::new("a.pdf", b"a")])
        .await;
    let second = app
        .create_upload(&token, "P-1", "Bracket", vec![TestFile::new("a.pdf", b"a")])
        .await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn detail_lists_files_in_submission_order() {
    let app = TestApp::spawn().await;
    let upload_id = app
        .create_upload(
            &app.vendor_a_token(),
            "P-9",
            "Gear",
            vec![TestFile::new("a.txt", b"a"), TestFile::new("b.txt", b"bb")],
        )
        .await;

    let res = app
        .get_with_token(&routes::upload(upload_id), &app.manager_token())
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["part_number"], "P-9");
    assert_eq!(res.body["owner_display_name"], "Alice Vendor");
    assert_eq!(res.body["file_count"], 2);

    let files = res.body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    let created: Vec<&str> = files
        .iter()
        .map(|f| f["created_at"].as_str().unwrap())
        .collect();
    let mut sorted = created.clone();
    sorted.sort();
    assert_eq!(created, sorted);
}

#[tokio::test]
async fn detail_of_other_vendors_upload_is_hidden() {
    let app = TestApp::spawn().await;
    let upload_id = app
        .create_upload(
            &app.vendor_a_token(),
            "P-9",
            "Gear",
            vec![TestFile::new("a.txt", b"a")],
        )
        .await;

    let res = app
        .get_with_token(&routes::upload(upload_id), &app.vendor_b_token())
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");

    let res = app
        .get_with_token(&routes::upload(uuid::Uuid::now_v7()), &app.manager_token())
        .await;
    assert_eq!(res.status, 404);

    let res = app
        .get_with_token("/api/v1/uploads/not-a-uuid", &app.manager_token())
        .await;
    assert_eq!(res.status, 400);
}
