//! EmailLogRepository 統合テスト
//!
//! データベースを使用したテスト。sqlx::test マクロを使用して、
//! テストごとに独立したデータベースを作成する。
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://... cargo test -p mailflow-infra --test email_log_repository_test
//! ```

use chrono::{NaiveDate, TimeZone, Utc};
use mailflow_domain::{
    email_log::{DeliveryStatus, EmailLog},
    notification::{NotificationError, NotificationRequest},
};
use mailflow_infra::repository::{EmailLogRepository, PostgresEmailLogRepository};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use sqlx::PgPool;

fn make_request() -> NotificationRequest {
    serde_json::from_value(json!({
        "Type": "email",
        "EmailType": "Table-Information",
        "RecieverMail": ["tanaka@example.com", "sato@example.com"],
        "CarbonCopyTo": "suzuki@example.com",
        "Subject": "延滞案件一覧",
        "EmailBody": {
            "Reciever_Name": "田中",
            "Table_Filter_infor": { "data": [{ "A": "x" }] }
        },
        "Attachments": ["report.pdf"]
    }))
    .expect("リクエストの作成に失敗")
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_送信成功の監査ログを挿入できる(pool: PgPool) {
    let sut = PostgresEmailLogRepository::new(pool.clone());
    let sent_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
    let log = EmailLog::from_attempt(&make_request(), sent_at, Ok(()));

    let result = sut.insert(&log).await;
    assert!(result.is_ok());

    // 挿入されたデータを直接 SQL で検証
    let row: (String, Vec<String>, Vec<String>, String, Value, Vec<String>, NaiveDate, String) =
        sqlx::query_as(
            r#"
            SELECT notification_type, "to", cc, template, body, attachments, date, status
            FROM email_logs WHERE id = $1
            "#,
        )
        .bind(log.id.as_uuid())
        .fetch_one(&pool)
        .await
        .expect("挿入されたログが見つからない");

    assert_eq!(row.0, "email");
    assert_eq!(row.1, vec!["tanaka@example.com", "sato@example.com"]);
    assert_eq!(row.2, vec!["suzuki@example.com"]);
    assert_eq!(row.3, "Table-Information");
    assert_eq!(row.4["Reciever_Name"], json!("田中"));
    assert_eq!(row.5, vec!["report.pdf"]);
    assert_eq!(row.6, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    assert_eq!(row.7, "success");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_送信失敗の監査ログはエラーメッセージ付きで挿入される(pool: PgPool) {
    let sut = PostgresEmailLogRepository::new(pool.clone());
    let error = NotificationError::Delivery("SMTP connection refused".to_string());
    let log = EmailLog::from_attempt(&make_request(), Utc::now(), Err(&error));
    assert_eq!(log.status, DeliveryStatus::Failed);

    sut.insert(&log).await.expect("挿入に失敗");

    let row: (String, Option<String>) =
        sqlx::query_as(r#"SELECT status, error_message FROM email_logs WHERE id = $1"#)
            .bind(log.id.as_uuid())
            .fetch_one(&pool)
            .await
            .expect("挿入されたログが見つからない");

    assert_eq!(row.0, "failed");
    assert_eq!(
        row.1,
        Some("メール送信に失敗: SMTP connection refused".to_string())
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_同じリクエストでも送信試行ごとに別の行になる(pool: PgPool) {
    let sut = PostgresEmailLogRepository::new(pool.clone());
    let request = make_request();

    sut.insert(&EmailLog::from_attempt(&request, Utc::now(), Ok(())))
        .await
        .unwrap();
    sut.insert(&EmailLog::from_attempt(&request, Utc::now(), Ok(())))
        .await
        .unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM email_logs")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_プールが閉じている場合は接続エラーになる(pool: PgPool) {
    let sut = PostgresEmailLogRepository::new(pool.clone());
    pool.close().await;

    let log = EmailLog::from_attempt(&make_request(), Utc::now(), Ok(()));
    let error = sut.insert(&log).await.unwrap_err();

    assert!(error.is_connection());
    assert!(matches!(
        NotificationError::from(error),
        NotificationError::DatabaseConnection(_)
    ));
}
