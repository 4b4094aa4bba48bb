use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::domain::editor::{EditTarget, Insertion};
use crate::domain::error::AppError;
use crate::domain::provider::{Provider, ProviderCredentials};
use crate::domain::session::{AuthSession, AuthState, AuthTransition};
use crate::domain::settings::ClientSettings;
use crate::domain::style::Style;
use crate::domain::types::{
    ApprovalResult, CollectionTriggered, ContentTarget, Draft, ExportPayload, Item, ItemDetail,
    ItemQuery, ItemStats, ItemUpdate, MessageResponse, QueueEntry, RegisterRequest, Source,
    SourceCreate, SourceUpdate, UploadedImage, User, UserAdminUpdate, UserSettingsUpdate,
};
use crate::domain::writer::{ImageRef, WriterDocument};
use crate::infra::api::{image_mime_for, ApiClient, ApiError};
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::infra::output::OutputRouter;
use crate::infra::post_processor::PostProcessor;
use crate::infra::rewriter::{ApiRewriter, Rewriter};
use crate::infra::storage::Storage;
use crate::usecase::rewrite::{RewriteOrchestrator, RewriteOutcome};

/// アプリケーションサービス（CLI から使うファサード）
pub struct AppService {
    session: Arc<Mutex<AuthSession>>,
    api: Arc<ApiClient>,
    storage: Mutex<Storage>,
    orchestrator: RewriteOrchestrator,
    output_router: OutputRouter,
    metrics: Metrics,
    settings: ClientSettings,
}

impl AppService {
    /// 保存済み設定とトークンから組み立てる。リライトはバックエンド経由
    pub fn new(storage: Storage) -> Result<Self, AppError> {
        let settings = storage.get_settings()?.with_env_overrides();
        Self::with_api_rewriter(storage, settings)
    }

    pub fn with_api_rewriter(storage: Storage, settings: ClientSettings) -> Result<Self, AppError> {
        let session = Arc::new(Mutex::new(AuthSession::restore(storage.load_token()?)));
        let api = Arc::new(ApiClient::new(&settings, session.clone())?);
        let rewriter: Arc<dyn Rewriter> = Arc::new(ApiRewriter::new(api.clone()));

        Ok(Self::assemble(
            storage,
            settings,
            session,
            api,
            rewriter,
            OutputRouter::new(),
        ))
    }

    /// リライターと出力先を差し替えて組み立てる
    pub fn with_parts(
        storage: Storage,
        settings: ClientSettings,
        rewriter: Arc<dyn Rewriter>,
        output_router: OutputRouter,
    ) -> Result<Self, AppError> {
        let session = Arc::new(Mutex::new(AuthSession::restore(storage.load_token()?)));
        let api = Arc::new(ApiClient::new(&settings, session.clone())?);
        Ok(Self::assemble(
            storage,
            settings,
            session,
            api,
            rewriter,
            output_router,
        ))
    }

    fn assemble(
        storage: Storage,
        settings: ClientSettings,
        session: Arc<Mutex<AuthSession>>,
        api: Arc<ApiClient>,
        rewriter: Arc<dyn Rewriter>,
        output_router: OutputRouter,
    ) -> Self {
        log::debug!(
            "AppService 初期化: api={} rewriter={}",
            api.base_url(),
            rewriter.name()
        );
        Self {
            session,
            api,
            storage: Mutex::new(storage),
            orchestrator: RewriteOrchestrator::new(rewriter),
            output_router,
            metrics: Metrics::new(),
            settings,
        }
    }

    /// リライトに使うモデルを指定する
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.orchestrator = self.orchestrator.with_model(model);
        self
    }

    /// エラーを記録し、認証エラーなら保存済みトークンも消す
    fn fail(&self, err: AppError) -> AppError {
        self.metrics.inc_error(err.code);
        if err.is_auth() {
            log::warn!("認証エラーのため保存済みトークンを削除: {}", err.message);
            if let Err(e) = self.storage.lock().clear_token() {
                log::error!("トークン削除に失敗: {e}");
            }
        }
        err
    }

    fn track<T>(&self, result: Result<T, ApiError>) -> Result<T, AppError> {
        result.map_err(|e| self.fail(AppError::from(e)))
    }

    // ==================== Auth ====================

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthTransition, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("ユーザー名とパスワードを入力してください"));
        }

        let token = self.track(self.api.login(username, password).await)?;
        let transition = self.session.lock().login(token.access_token.clone());
        self.storage.lock().save_token(&token.access_token)?;
        self.metrics.inc_logins();

        log::info!(
            "ログイン: {username} ({} → {})",
            transition.prev_state,
            transition.new_state
        );
        Ok(transition)
    }

    pub fn logout(&self) -> Result<AuthTransition, AppError> {
        let transition = self.session.lock().logout();
        self.storage.lock().clear_token()?;
        log::info!("ログアウト ({} → {})", transition.prev_state, transition.new_state);
        Ok(transition)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<MessageResponse, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("ユーザー名とパスワードを入力してください"));
        }
        let req = RegisterRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        self.track(self.api.register(&req).await)
    }

    pub fn auth_state(&self) -> AuthState {
        self.session.lock().state().clone()
    }

    pub async fn me(&self) -> Result<User, AppError> {
        self.track(self.api.me().await)
    }

    /// プロバイダごとのキー登録状況（`/api/auth/me` から）
    pub async fn provider_credentials(&self) -> Result<ProviderCredentials, AppError> {
        let user = self.me().await?;
        Ok(ProviderCredentials::from_user(&user))
    }

    pub async fn update_api_keys(&self, update: &UserSettingsUpdate) -> Result<User, AppError> {
        if update.openai_api_key.is_none()
            && update.gemini_api_key.is_none()
            && update.perplexity_api_key.is_none()
        {
            return Err(AppError::validation("更新するキーがありません"));
        }
        self.track(self.api.update_settings(update).await)
    }

    // ==================== Items ====================

    pub async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>, AppError> {
        self.track(self.api.list_items(query).await)
    }

    pub async fn item_stats(&self) -> Result<ItemStats, AppError> {
        self.track(self.api.item_stats().await)
    }

    pub async fn get_item(&self, item_id: i64) -> Result<ItemDetail, AppError> {
        self.track(self.api.get_item(item_id).await)
    }

    pub async fn update_item(&self, item_id: i64, update: &ItemUpdate) -> Result<Item, AppError> {
        if update.is_empty() {
            return Err(AppError::validation("更新する項目がありません"));
        }
        self.track(self.api.update_item(item_id, update).await)
    }

    pub async fn queue_item(&self, item_id: i64) -> Result<MessageResponse, AppError> {
        self.track(self.api.queue_item(item_id).await)
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<MessageResponse, AppError> {
        self.track(self.api.delete_item(item_id).await)
    }

    pub async fn bulk_delete_items(&self, item_ids: &[i64]) -> Result<MessageResponse, AppError> {
        if item_ids.is_empty() {
            return Err(AppError::validation("削除するアイテムを指定してください"));
        }
        self.track(self.api.bulk_delete_items(item_ids).await)
    }

    pub async fn delete_all_items(&self) -> Result<MessageResponse, AppError> {
        self.track(self.api.delete_all_items().await)
    }

    // ==================== Sources ====================

    pub async fn list_sources(&self) -> Result<Vec<Source>, AppError> {
        self.track(self.api.list_sources().await)
    }

    pub async fn create_source(&self, source: &SourceCreate) -> Result<Source, AppError> {
        if source.name.trim().is_empty() || source.base_url.trim().is_empty() {
            return Err(AppError::validation("ソース名と URL は必須です"));
        }
        if source.collect_interval <= 0 {
            return Err(AppError::validation("収集間隔は正の値にしてください"));
        }
        self.track(self.api.create_source(source).await)
    }

    pub async fn set_source_enabled(
        &self,
        source_id: i64,
        enabled: bool,
    ) -> Result<MessageResponse, AppError> {
        self.track(self.api.toggle_source(source_id, enabled).await)
    }

    pub async fn update_source(
        &self,
        source_id: i64,
        update: &SourceUpdate,
    ) -> Result<Source, AppError> {
        self.track(self.api.update_source(source_id, update).await)
    }

    pub async fn delete_source(&self, source_id: i64) -> Result<MessageResponse, AppError> {
        self.track(self.api.delete_source(source_id).await)
    }

    pub async fn collect_source(&self, source_id: i64) -> Result<CollectionTriggered, AppError> {
        self.track(self.api.collect_source(source_id).await)
    }

    // ==================== Queue ====================

    pub async fn list_queue(&self) -> Result<Vec<QueueEntry>, AppError> {
        self.track(self.api.list_queue().await)
    }

    pub async fn approve_queue(
        &self,
        queue_id: i64,
        note: Option<&str>,
    ) -> Result<ApprovalResult, AppError> {
        self.track(self.api.approve_queue(queue_id, note).await)
    }

    pub async fn reject_queue(
        &self,
        queue_id: i64,
        note: Option<&str>,
    ) -> Result<ApprovalResult, AppError> {
        self.track(self.api.reject_queue(queue_id, note).await)
    }

    pub async fn export_queue(&self, queue_id: i64) -> Result<ExportPayload, AppError> {
        self.track(self.api.export_queue(queue_id).await)
    }

    // ==================== Users ====================

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.track(self.api.list_users().await)
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        update: &UserAdminUpdate,
    ) -> Result<User, AppError> {
        self.track(self.api.update_user(user_id, update).await)
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<MessageResponse, AppError> {
        self.track(self.api.delete_user(user_id).await)
    }

    // ==================== Writer ====================

    /// アイテムを取得してリライト用ドキュメントを開く
    pub async fn open_item(
        &self,
        item_id: i64,
        target: ContentTarget,
    ) -> Result<WriterDocument, AppError> {
        let detail = self.get_item(item_id).await?;
        Ok(WriterDocument::from_item(target, &detail))
    }

    /// 画像をアップロードしてドキュメントの画像一覧に追加する
    pub async fn upload_image(
        &self,
        doc: &mut WriterDocument,
        path: &Path,
    ) -> Result<UploadedImage, AppError> {
        let mime = image_mime_for(path).ok_or_else(|| {
            AppError::validation(format!("画像ファイルではありません: {}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::validation(format!("ファイルを読めません ({}): {e}", path.display())))?;

        let start = Instant::now();
        let uploaded = self.track(self.api.upload_image(&file_name, mime, bytes).await)?;
        self.metrics
            .record_latency("upload", start.elapsed().as_millis() as u64);
        self.metrics.inc_images_uploaded();

        doc.add_image(ImageRef {
            url: uploaded.url.clone(),
            file: Some(path.to_path_buf()),
        });
        log::info!("画像アップロード: {file_name} → {}", uploaded.url);
        Ok(uploaded)
    }

    pub fn insert_image(
        &self,
        doc: &mut WriterDocument,
        target: EditTarget,
        url: &str,
    ) -> Result<Insertion, AppError> {
        let insertion = doc
            .insert_image_reference(target, url)
            .map_err(|e| self.fail(e))?;
        self.metrics.inc_images_inserted();
        Ok(insertion)
    }

    /// リライトを送れる状態か事前に確かめる（通信なし）
    pub fn check_rewrite(
        &self,
        doc: &WriterDocument,
        style: Style,
        provider: Provider,
        custom_instruction: Option<&str>,
        credentials: &ProviderCredentials,
    ) -> Result<(), AppError> {
        self.orchestrator
            .prepare(doc, style, provider, custom_instruction, credentials)
            .map(|_| ())
            .map_err(|e| self.fail(e))
    }

    /// リライトを実行し、設定に応じて下書きを保存する
    pub async fn rewrite(
        &self,
        doc: &mut WriterDocument,
        style: Style,
        provider: Provider,
        custom_instruction: Option<&str>,
        credentials: &ProviderCredentials,
    ) -> Result<RewriteOutcome, AppError> {
        self.metrics.inc_rewrites_requested();
        let start = Instant::now();

        let outcome = match self
            .orchestrator
            .rewrite(doc, style, provider, custom_instruction, credentials)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.inc_rewrites_failed();
                return Err(self.fail(e));
            }
        };

        if let RewriteOutcome::Rewritten { text, .. } = &outcome {
            self.metrics
                .record_latency("rewrite", start.elapsed().as_millis() as u64);
            self.metrics.inc_rewrites_succeeded();

            if self.settings.save_drafts {
                let draft = Draft {
                    draft_id: uuid::Uuid::new_v4().to_string(),
                    item_id: doc.item_id(),
                    target: doc.target(),
                    style: style.as_str().to_string(),
                    provider: provider.as_str().to_string(),
                    source_text: doc.source_text().to_string(),
                    rewritten_text: text.clone(),
                    created_at: chrono::Utc::now().to_rfc3339(),
                };
                // 保存失敗でリライト結果は捨てない
                match self.storage.lock().insert_draft(&draft) {
                    Ok(()) => log::debug!("下書きを保存: {}", draft.draft_id),
                    Err(e) => {
                        self.metrics.inc_error(e.code);
                        log::warn!("下書きの保存に失敗: {}", e.message);
                    }
                }
            }
        }

        Ok(outcome)
    }

    // ==================== Drafts ====================

    pub fn list_drafts(&self, limit: u32) -> Result<Vec<Draft>, AppError> {
        self.storage.lock().list_drafts(limit)
    }

    pub fn get_draft(&self, draft_id: &str) -> Result<Draft, AppError> {
        self.storage
            .lock()
            .get_draft(draft_id)?
            .ok_or_else(|| AppError::validation(format!("下書きが見つかりません: {draft_id}")))
    }

    pub fn delete_draft(&self, draft_id: &str) -> Result<bool, AppError> {
        self.storage.lock().delete_draft(draft_id)
    }

    pub fn copy_draft(&self, draft_id: &str) -> Result<Draft, AppError> {
        let draft = self.get_draft(draft_id)?;
        self.copy_to_clipboard(&draft.rewritten_text)?;
        Ok(draft)
    }

    /// 古い下書きを削除する。ttl_days 未指定なら設定値、0 なら何もしない
    pub fn prune_drafts(&self, ttl_days: Option<u32>) -> Result<u32, AppError> {
        let ttl_days = ttl_days.unwrap_or(self.settings.draft_ttl_days);
        if ttl_days == 0 {
            return Ok(0);
        }

        let cutoff = chrono::TimeDelta::try_days(i64::from(ttl_days))
            .and_then(|ttl| chrono::Utc::now().checked_sub_signed(ttl))
            .ok_or_else(|| AppError::validation(format!("保持日数が大きすぎます: {ttl_days}")))?;
        let deleted = self.storage.lock().delete_old_drafts(&cutoff.to_rfc3339())?;
        log::info!("下書きクリーンアップ: {deleted} 件削除（TTL: {ttl_days}日）");
        Ok(deleted)
    }

    // ==================== Output ====================

    /// プレーンテキストと HTML の両方をクリップボードへ
    pub fn copy_to_clipboard(&self, text: &str) -> Result<(), AppError> {
        self.output_router
            .deliver_clipboard(text)
            .map_err(|e| self.fail(e))
    }

    pub fn render_html(&self, text: &str) -> String {
        PostProcessor::to_html(text)
    }

    // ==================== Settings ====================

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn get_settings(&self) -> Result<ClientSettings, AppError> {
        self.storage.lock().get_settings()
    }

    /// 保存のみ。接続先の変更は次回起動から有効
    pub fn update_settings(&self, settings: &ClientSettings) -> Result<(), AppError> {
        if settings.timeout_secs == 0 {
            return Err(AppError::validation("タイムアウトは 1 秒以上にしてください"));
        }
        self.storage.lock().save_settings(settings)
    }

    // ==================== Metrics ====================

    pub fn get_metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }
}
