//! # Mail Service サーバー
//!
//! 通知リクエストを受け取り、テンプレートから HTML メールを生成して送信し、
//! 送信結果を監査ログ（`email_logs`）に記録する。
//!
//! ```text
//! POST /api/v1/send-emails
//!   → TemplateRenderer（+ 表フォーマッタ）
//!   → MessageComposer（添付ファイル）
//!   → NotificationSender（SMTP）
//!   → EmailLogRepository（PostgreSQL）
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `MAIL_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `MAIL_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `MAIL_BACKEND` | No | `smtp` / `noop`（デフォルト: `smtp`） |
//! | `SMTP_HOST` | No | SMTP ホスト（デフォルト: `localhost`） |
//! | `SMTP_PORT` | No | SMTP ポート（デフォルト: `587`） |
//! | `SMTP_USER` / `SMTP_PASSWORD` | No | SMTP 認証情報（両方ある場合のみ認証） |
//! | `SMTP_SECURITY` | No | `starttls` / `tls` / `none`（デフォルト: `starttls`） |
//! | `SMTP_TIMEOUT_SECS` | No | SMTP の I/O タイムアウト秒（デフォルト: `30`） |
//! | `MAIL_FROM_ADDRESS` | No | 送信元アドレス（デフォルト: `SMTP_USER`） |
//! | `MAIL_FROM_NAME` | No | 送信元の表示名 |
//! | `TEMPLATE_DIR` | No | テンプレートディレクトリ |
//! | `ATTACHMENT_DIR` | No | 添付ファイルディレクトリ（デフォルト: `Attachments`） |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit などのローカルリレー）
//! MAIL_PORT=8000 SMTP_PORT=1025 SMTP_SECURITY=none cargo run -p mailflow-mail-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use mailflow_domain::{
    clock::{Clock, SystemClock},
    template::TemplateRegistry,
};
use mailflow_infra::{
    AttachmentStore,
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
    db,
    repository::PostgresEmailLogRepository,
};
use mailflow_mail_service::{
    config::{MailBackend, MailConfig},
    handler::{EmailState, router},
    usecase::{
        Dispatcher,
        MessageComposer,
        NotificationService,
        TemplateRenderer,
        TokioBackgroundRunner,
    },
};
use mailflow_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Mail Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("mail-service"));

    let config = MailConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Mail Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // 監査ログストア
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 添付ファイルディレクトリ
    let attachments = AttachmentStore::new(&config.attachment_dir);
    attachments.ensure_dir().with_context(|| {
        format!(
            "添付ファイルディレクトリを作成できません: {}",
            attachments.dir().display()
        )
    })?;
    tracing::info!(dir = %attachments.dir().display(), "添付ファイルディレクトリを使用します");

    // 送信
    let sender: Arc<dyn NotificationSender> = match config.notification.backend {
        MailBackend::Smtp => {
            let smtp = &config.notification.smtp;
            tracing::info!(
                smtp.host = %smtp.host,
                smtp.port = smtp.port,
                smtp.security = %smtp.security,
                smtp.auth = smtp.has_credentials(),
                "SMTP で送信します"
            );
            Arc::new(
                SmtpNotificationSender::new(smtp).context("SMTP トランスポートの作成に失敗しました")?,
            )
        }
        MailBackend::Noop => {
            tracing::warn!("MAIL_BACKEND=noop のためメールは送信されません");
            Arc::new(NoopNotificationSender)
        }
    };

    // テンプレート
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let renderer = TemplateRenderer::from_dir(
        &config.template_dir,
        TemplateRegistry::standard(),
        Arc::clone(&clock),
    )
    .context("テンプレートの読み込みに失敗しました")?;

    let service = NotificationService::new(
        renderer,
        MessageComposer::new(config.notification.from.clone(), attachments),
        sender,
        Arc::new(PostgresEmailLogRepository::new(pool)),
        Arc::clone(&clock),
    );

    let state = Arc::new(EmailState {
        dispatcher: Dispatcher::new(Arc::new(service)),
        runner: Arc::new(TokioBackgroundRunner),
        clock,
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Mail Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Mail Service サーバーを停止しました");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルハンドラの登録に失敗: {}", e);
    }
}
