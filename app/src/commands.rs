use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Serialize;

use ca_core::domain::error::AppError;
use ca_core::domain::provider::{Provider, ProviderCredentials};
use ca_core::domain::settings::ClientSettings;
use ca_core::domain::style::Style;
use ca_core::domain::types::{
    ContentTarget, Item, ItemQuery, ItemUpdate, SourceCreate, SourceUpdate, UserAdminUpdate,
    UserSettingsUpdate,
};
use ca_core::domain::editor::{EditTarget, ImageMarkup};
use ca_core::domain::writer::WriterDocument;
use ca_core::infra::api::image_mime_for;
use ca_core::usecase::app_service::AppService;
use ca_core::usecase::rewrite::RewriteOutcome;

use crate::cli::{
    Command, DraftsCommand, ItemFilter, ItemsCommand, QueueCommand, RewriteArgs, SettingsCommand,
    SourcesCommand, UsersCommand,
};

/// コマンドエラー型
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{}", .0.message)]
    App(#[from] AppError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

type CmdResult<T> = Result<T, CommandError>;

/// 出力形式（人間向けテキストか JSON）
#[derive(Clone, Copy)]
pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// JSON モードなら値を、そうでなければ text の結果を表示
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> CmdResult<()> {
        let out = if self.json {
            serde_json::to_string_pretty(value)?
        } else {
            text(value)
        };
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{out}")?;
        Ok(())
    }

    fn message(&self, msg: &str) -> CmdResult<()> {
        self.emit(&serde_json::json!({ "message": msg }), |_| msg.to_string())
    }
}

pub async fn run(service: &AppService, command: Command, printer: Printer) -> CmdResult<()> {
    match command {
        Command::Login { username, password } => {
            let password = password_or_prompt(password)?;
            let t = service.login(&username, &password).await?;
            printer.emit(&t, |_| format!("{username} でログインしました"))
        }
        Command::Logout => {
            let t = service.logout()?;
            printer.emit(&t, |_| "ログアウトしました".to_string())
        }
        Command::Register { username, password } => {
            let password = password_or_prompt(password)?;
            let res = service.register(&username, &password).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        Command::Me => {
            let user = service.me().await?;
            let creds = ProviderCredentials::from_user(&user);
            let view = serde_json::json!({
                "id": user.id,
                "username": &user.username,
                "role": &user.role,
                "expires_at": &user.expires_at,
                "providers": creds,
            });
            printer.emit(&view, |_| {
                let mut lines = vec![format!("{} ({}) id={}", user.username, user.role, user.id)];
                if let Some(exp) = &user.expires_at {
                    lines.push(format!("利用期限: {exp}"));
                }
                for p in Provider::ALL {
                    let mark = if creds.is_configured(p) { "登録済み" } else { "未登録" };
                    lines.push(format!("  {:<10} {mark}", p.display_name()));
                }
                lines.join("\n")
            })
        }
        Command::Settings(cmd) => run_settings(service, cmd, printer).await,
        Command::Items(cmd) => run_items(service, cmd, printer).await,
        Command::Sources(cmd) => run_sources(service, cmd, printer).await,
        Command::Queue(cmd) => run_queue(service, cmd, printer).await,
        Command::Users(cmd) => run_users(service, cmd, printer).await,
        Command::Upload { file, target } => {
            let target = target
                .map(ContentTarget::from)
                .unwrap_or(service.settings().default_target);
            // 単発アップロードは捨てドキュメントに載せる
            let mut doc = WriterDocument::new(target, "");
            let uploaded = service.upload_image(&mut doc, &file).await?;
            printer.emit(&uploaded, |u| {
                format!("{}\n{}", u.url, ImageMarkup::for_target(target).render(&u.url).trim())
            })
        }
        Command::Rewrite(args) => run_rewrite(service, args, printer).await,
        Command::Drafts(cmd) => run_drafts(service, cmd, printer),
    }
}

// ==================== Settings ====================

async fn run_settings(service: &AppService, cmd: SettingsCommand, printer: Printer) -> CmdResult<()> {
    match cmd {
        SettingsCommand::Show => {
            let settings = service.get_settings()?;
            printer.emit(&settings, |s| {
                format!(
                    "api_base_url    {}\ntimeout_secs    {}\ndefault_target  {}\ndefault_provider {}\nsave_drafts     {}\ndraft_ttl_days  {}\nauth            {}",
                    s.api_base_url,
                    s.timeout_secs,
                    s.default_target.as_str(),
                    s.default_provider,
                    s.save_drafts,
                    s.draft_ttl_days,
                    service.auth_state().as_str(),
                )
            })
        }
        SettingsCommand::Set { key, value } => {
            let updated = apply_setting(service.get_settings()?, &key, &value)?;
            service.update_settings(&updated)?;
            printer.message(&format!("{key} を更新しました"))
        }
        SettingsCommand::Keys {
            openai,
            gemini,
            perplexity,
        } => {
            let update = UserSettingsUpdate {
                openai_api_key: openai,
                gemini_api_key: gemini,
                perplexity_api_key: perplexity,
            };
            let user = service.update_api_keys(&update).await?;
            let creds = ProviderCredentials::from_user(&user);
            printer.emit(&creds, |c| {
                Provider::ALL
                    .iter()
                    .map(|p| {
                        let mark = if c.is_configured(*p) { "登録済み" } else { "未登録" };
                        format!("{:<10} {mark}", p.display_name())
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

/// `key=value` を設定に適用する。値は JSON として解釈できなければ文字列扱い
fn apply_setting(settings: ClientSettings, key: &str, value: &str) -> CmdResult<ClientSettings> {
    let mut json = serde_json::to_value(&settings)?;
    let obj = json
        .as_object_mut()
        .ok_or_else(|| CommandError::Usage("settings is not an object".into()))?;
    if !obj.contains_key(key) {
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        return Err(CommandError::Usage(format!(
            "unknown setting `{key}` (available: {})",
            keys.join(", ")
        )));
    }

    let parsed = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    obj.insert(key.to_string(), parsed);

    serde_json::from_value(json)
        .map_err(|e| CommandError::Usage(format!("invalid value for `{key}`: {e}")))
}

// ==================== Items ====================

fn item_line(item: &Item) -> String {
    format!(
        "{:>6}  {:<10} {:<8} {}",
        item.id,
        item.status,
        item.category.as_deref().unwrap_or("-"),
        item.title
    )
}

impl From<ItemFilter> for ItemQuery {
    fn from(f: ItemFilter) -> Self {
        ItemQuery {
            status: f.status,
            category: f.category,
            source_type: f.source_type,
            region: f.region,
            source_id: f.source_id,
            search: f.query,
            skip: f.skip,
            limit: f.limit,
        }
    }
}

async fn run_items(service: &AppService, cmd: ItemsCommand, printer: Printer) -> CmdResult<()> {
    match cmd {
        ItemsCommand::List(filter) => {
            let items = service.list_items(&ItemQuery::from(filter)).await?;
            printer.emit(&items, |items| {
                if items.is_empty() {
                    return "アイテムがありません".to_string();
                }
                items.iter().map(item_line).collect::<Vec<_>>().join("\n")
            })
        }
        ItemsCommand::Show { id } => {
            let detail = service.get_item(id).await?;
            printer.emit(&detail, |d| {
                let mut out = format!("{}\n{}\n", item_line(&d.item), d.item.url);
                if let Some(summary) = &d.item.summary_text {
                    out.push_str(&format!("\n{summary}\n"));
                }
                if let Some(raw) = &d.raw_text {
                    out.push_str(&format!("\n{raw}\n"));
                }
                for url in d.item.image_urls.iter().flatten() {
                    out.push_str(&format!("image: {url}\n"));
                }
                out
            })
        }
        ItemsCommand::Update {
            id,
            title,
            summary,
            category,
            region,
            tags,
        } => {
            let update = ItemUpdate {
                title,
                summary_text: summary,
                category,
                region,
                tags,
            };
            let item = service.update_item(id, &update).await?;
            printer.emit(&item, item_line)
        }
        ItemsCommand::Queue { id } => {
            let res = service.queue_item(id).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        ItemsCommand::Delete { id } => {
            let res = service.delete_item(id).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        ItemsCommand::BulkDelete { ids } => {
            let res = service.bulk_delete_items(&ids).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        ItemsCommand::DeleteAll { yes } => {
            if !yes {
                return Err(CommandError::Usage(
                    "全アイテムを削除します。実行するには --yes を付けてください".into(),
                ));
            }
            let res = service.delete_all_items().await?;
            printer.emit(&res, |r| r.message.clone())
        }
        ItemsCommand::Stats => {
            let stats = service.item_stats().await?;
            printer.emit(&stats, |s| {
                serde_json::to_string_pretty(s).unwrap_or_else(|_| s.to_string())
            })
        }
    }
}

// ==================== Sources ====================

async fn run_sources(service: &AppService, cmd: SourcesCommand, printer: Printer) -> CmdResult<()> {
    match cmd {
        SourcesCommand::List => {
            let sources = service.list_sources().await?;
            printer.emit(&sources, |sources| {
                sources
                    .iter()
                    .map(|s| {
                        format!(
                            "{:>4}  {:<3} {:<8} {:<20} {}",
                            s.id,
                            if s.enabled { "on" } else { "off" },
                            s.source_type,
                            s.name,
                            s.base_url
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        SourcesCommand::Add {
            name,
            source_type,
            url,
            interval,
            crawl_policy,
        } => {
            let create = SourceCreate {
                name,
                source_type,
                base_url: url,
                collect_interval: interval,
                crawl_policy,
            };
            let source = service.create_source(&create).await?;
            printer.emit(&source, |s| format!("ソースを追加しました: {} (id={})", s.name, s.id))
        }
        SourcesCommand::Enable { id } => {
            let res = service.set_source_enabled(id, true).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        SourcesCommand::Disable { id } => {
            let res = service.set_source_enabled(id, false).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        SourcesCommand::Update {
            id,
            name,
            source_type,
            url,
            interval,
            crawl_policy,
        } => {
            let update = SourceUpdate {
                name,
                source_type,
                base_url: url,
                collect_interval: interval,
                crawl_policy,
                enabled: None,
            };
            let source = service.update_source(id, &update).await?;
            printer.emit(&source, |s| format!("ソースを更新しました: {} (id={})", s.name, s.id))
        }
        SourcesCommand::Delete { id } => {
            let res = service.delete_source(id).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        SourcesCommand::Collect { id } => {
            let res = service.collect_source(id).await?;
            printer.emit(&res, |r| match &r.task_id {
                Some(task) => format!("{} (task={task})", r.message),
                None => r.message.clone(),
            })
        }
    }
}

// ==================== Queue ====================

async fn run_queue(service: &AppService, cmd: QueueCommand, printer: Printer) -> CmdResult<()> {
    match cmd {
        QueueCommand::List => {
            let entries = service.list_queue().await?;
            printer.emit(&entries, |entries| {
                if entries.is_empty() {
                    return "キューは空です".to_string();
                }
                entries
                    .iter()
                    .map(|e| {
                        let approved = if e.approved_at.is_some() { "approved" } else { "pending" };
                        format!("{:>5}  item={:<6} {:<9} {}", e.id, e.item_id, approved, e.item_title)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        QueueCommand::Approve { id, note } => {
            let res = service.approve_queue(id, note.as_deref()).await?;
            printer.emit(&res, |r| match &r.payload_text {
                Some(payload) => format!("{}\n\n{payload}", r.message),
                None => r.message.clone(),
            })
        }
        QueueCommand::Reject { id, note } => {
            let res = service.reject_queue(id, note.as_deref()).await?;
            printer.emit(&res, |r| r.message.clone())
        }
        QueueCommand::Export { id } => {
            let payload = service.export_queue(id).await?;
            printer.emit(&payload, |p| p.payload_text.clone().unwrap_or_default())
        }
    }
}

// ==================== Users ====================

async fn run_users(service: &AppService, cmd: UsersCommand, printer: Printer) -> CmdResult<()> {
    match cmd {
        UsersCommand::List => {
            let users = service.list_users().await?;
            printer.emit(&users, |users| {
                users
                    .iter()
                    .map(|u| {
                        format!(
                            "{:>4}  {:<16} {:<6} expires={} logins={}",
                            u.id,
                            u.username,
                            u.role,
                            u.expires_at.as_deref().unwrap_or("-"),
                            u.login_count.unwrap_or(0)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        UsersCommand::Update {
            id,
            role,
            expires_at,
        } => {
            let update = UserAdminUpdate { role, expires_at };
            let user = service.update_user(id, &update).await?;
            printer.emit(&user, |u| format!("{} を更新しました ({})", u.username, u.role))
        }
        UsersCommand::Delete { id } => {
            let res = service.delete_user(id).await?;
            printer.emit(&res, |r| r.message.clone())
        }
    }
}

// ==================== Rewrite ====================

async fn run_rewrite(service: &AppService, args: RewriteArgs, printer: Printer) -> CmdResult<()> {
    let defaults = service.settings();
    let target = args
        .target
        .map(ContentTarget::from)
        .unwrap_or(defaults.default_target);
    let style = match &args.style {
        Some(name) => Style::parse(target, name)?,
        None => Style::default_for(target),
    };
    let provider = match &args.provider {
        Some(name) => Provider::parse(name)?,
        None => defaults.default_provider,
    };

    let mut doc = match (args.item, &args.file, &args.text) {
        (Some(id), _, _) => service.open_item(id, target).await?,
        (None, Some(path), _) => WriterDocument::new(target, read_source(path)?),
        (None, None, Some(text)) => WriterDocument::new(target, text.clone()),
        (None, None, None) => {
            return Err(CommandError::Usage(
                "--item, --file, --text のいずれかを指定してください".into(),
            ))
        }
    };
    if args.lock_source {
        doc.lock_source();
    }

    if doc.source_text().trim().is_empty() {
        log::warn!("原文が空のためリライトしません");
        return printer.emit(&RewriteOutcome::Skipped, |_| "原文が空です".to_string());
    }

    let credentials = service.provider_credentials().await?;

    let pane = EditTarget::from(args.insert_into);
    let has_images = !args.uploads.is_empty() || !args.images.is_empty();
    if let Some(bad) = args.uploads.iter().find(|p| image_mime_for(p).is_none()) {
        return Err(CommandError::Usage(format!(
            "画像ファイルではありません: {}",
            bad.display()
        )));
    }
    preflight(
        service,
        &doc,
        style,
        provider,
        args.instruction.as_deref(),
        &credentials,
        has_images.then_some(pane),
    )?;

    let mut urls = Vec::new();
    for path in &args.uploads {
        urls.push(service.upload_image(&mut doc, path).await?.url);
    }
    urls.extend(args.images.iter().cloned());

    // 原文への挿入は送信テキストに含める
    if pane == EditTarget::Source {
        for url in &urls {
            service.insert_image(&mut doc, pane, url)?;
        }
    }

    let outcome = service
        .rewrite(
            &mut doc,
            style,
            provider,
            args.instruction.as_deref(),
            &credentials,
        )
        .await?;

    if pane == EditTarget::Rewritten {
        for url in &urls {
            service.insert_image(&mut doc, pane, url)?;
        }
    }

    let text = doc.rewritten_text().to_string();
    if args.copy && !text.is_empty() {
        service.copy_to_clipboard(&text)?;
        log::info!("クリップボードにコピーしました");
    }

    let body = if args.html {
        service.render_html(&text)
    } else {
        text
    };
    let view = serde_json::json!({
        "outcome": outcome,
        "item_id": doc.item_id(),
        "target": doc.target(),
        "source_text": doc.source_text(),
        "rewritten_text": &body,
        "images": doc.images(),
    });
    printer.emit(&view, |_| body.clone())
}

/// アップロードやリライト要求の前に、ロックと入力を検証する
fn preflight(
    service: &AppService,
    doc: &WriterDocument,
    style: Style,
    provider: Provider,
    instruction: Option<&str>,
    credentials: &ProviderCredentials,
    image_pane: Option<EditTarget>,
) -> CmdResult<()> {
    if let Some(pane) = image_pane {
        doc.ensure_writable(pane)?;
    }
    service.check_rewrite(doc, style, provider, instruction, credentials)?;
    Ok(())
}

fn read_source(path: &Path) -> CmdResult<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        for line in io::stdin().lock().lines() {
            buf.push_str(&line?);
            buf.push('\n');
        }
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

// ==================== Drafts ====================

fn run_drafts(service: &AppService, cmd: DraftsCommand, printer: Printer) -> CmdResult<()> {
    match cmd {
        DraftsCommand::List { limit } => {
            let drafts = service.list_drafts(limit)?;
            printer.emit(&drafts, |drafts| {
                if drafts.is_empty() {
                    return "下書きはありません".to_string();
                }
                drafts
                    .iter()
                    .map(|d| {
                        let preview: String = d.rewritten_text.chars().take(40).collect();
                        format!(
                            "{}  {} {:<4} {:<9} {:<10} {}",
                            d.draft_id,
                            d.created_at,
                            d.target.as_str(),
                            d.style,
                            d.provider,
                            preview.replace('\n', " ")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        DraftsCommand::Show { id } => {
            let draft = service.get_draft(&id)?;
            printer.emit(&draft, |d| d.rewritten_text.clone())
        }
        DraftsCommand::Delete { id } => {
            if service.delete_draft(&id)? {
                printer.message(&format!("下書き {id} を削除しました"))
            } else {
                Err(AppError::validation(format!("下書きが見つかりません: {id}")).into())
            }
        }
        DraftsCommand::Copy { id } => {
            service.copy_draft(&id)?;
            printer.message("クリップボードにコピーしました")
        }
        DraftsCommand::Prune { days } => {
            let deleted = service.prune_drafts(days)?;
            printer.emit(&serde_json::json!({ "deleted": deleted }), |_| {
                format!("{deleted} 件の下書きを削除しました")
            })
        }
    }
}

fn password_or_prompt(password: Option<String>) -> CmdResult<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
