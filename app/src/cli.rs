use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ca_core::domain::editor::EditTarget;
use ca_core::domain::types::ContentTarget;

#[derive(Parser)]
#[command(
    name = "collector-admin",
    version,
    about = "Admin client for the content collector backend"
)]
pub struct Cli {
    /// ログを詳細に（-v: info, -vv: debug, -vvv: trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// ログをファイルにも書き出す
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// ローカル DB のパス（既定: CA_DB_PATH かデータディレクトリ）
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,

    /// 結果を JSON で出力
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// ログインしてトークンを保存
    Login {
        #[arg(short, long)]
        username: String,
        /// 省略時は標準入力から読む
        #[arg(short, long)]
        password: Option<String>,
    },
    Logout,
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// ログイン中のユーザーとプロバイダのキー登録状況
    Me,
    #[command(subcommand)]
    Settings(SettingsCommand),
    #[command(subcommand)]
    Items(ItemsCommand),
    #[command(subcommand)]
    Sources(SourcesCommand),
    #[command(subcommand)]
    Queue(QueueCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    /// 画像をアップロードして URL を表示
    Upload {
        file: PathBuf,
        /// 挿入用のマークアップも表示する書き出し先
        #[arg(long, value_enum)]
        target: Option<TargetArg>,
    },
    /// 原文をリライトする
    Rewrite(RewriteArgs),
    #[command(subcommand)]
    Drafts(DraftsCommand),
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Show,
    /// 設定値を1つ変更（例: timeout_secs 30）
    Set { key: String, value: String },
    /// AI プロバイダの API キーを登録
    Keys {
        #[arg(long)]
        openai: Option<String>,
        #[arg(long)]
        gemini: Option<String>,
        #[arg(long)]
        perplexity: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommand {
    List(ItemFilter),
    Show {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        region: Option<String>,
        /// カンマ区切り
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
    /// 承認キューに入れる
    Queue {
        id: i64,
    },
    Delete {
        id: i64,
    },
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    DeleteAll {
        /// 確認なしで実行
        #[arg(long)]
        yes: bool,
    },
    Stats,
}

#[derive(Args, Default)]
pub struct ItemFilter {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long = "type")]
    pub source_type: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub source_id: Option<i64>,
    /// タイトル・本文検索
    #[arg(short, long)]
    pub query: Option<String>,
    #[arg(long)]
    pub skip: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Subcommand)]
pub enum SourcesCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        source_type: String,
        #[arg(long)]
        url: String,
        /// 収集間隔（秒）
        #[arg(long, default_value_t = 3600)]
        interval: i64,
        #[arg(long)]
        crawl_policy: Option<String>,
    },
    Enable {
        id: i64,
    },
    Disable {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        source_type: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        interval: Option<i64>,
        #[arg(long)]
        crawl_policy: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// 手動収集を開始
    Collect {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    List,
    Approve {
        id: i64,
        #[arg(long)]
        note: Option<String>,
    },
    Reject {
        id: i64,
        #[arg(long)]
        note: Option<String>,
    },
    Export {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum UsersCommand {
    List,
    Update {
        id: i64,
        #[arg(long)]
        role: Option<String>,
        /// ISO 8601 日時
        #[arg(long)]
        expires_at: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum DraftsCommand {
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
    /// 書き換え文をクリップボードへ
    Copy {
        id: String,
    },
    /// 古い下書きを削除（省略時は設定の draft_ttl_days）
    Prune {
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Args)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["item", "file", "text"])))]
pub struct RewriteArgs {
    /// 収集アイテムから原文を作る
    #[arg(long)]
    pub item: Option<i64>,
    /// ファイルから原文を読む
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long, value_enum)]
    pub target: Option<TargetArg>,
    /// スタイル名（書き出し先の語彙から）
    #[arg(short, long)]
    pub style: Option<String>,
    /// openai | gemini | perplexity
    #[arg(short, long)]
    pub provider: Option<String>,
    /// custom スタイルの指示文
    #[arg(short, long)]
    pub instruction: Option<String>,
    /// サーバー既定以外のモデル
    #[arg(long)]
    pub model: Option<String>,

    /// アップロードして挿入する画像
    #[arg(long = "upload")]
    pub uploads: Vec<PathBuf>,
    /// 挿入する画像 URL
    #[arg(long = "image")]
    pub images: Vec<String>,
    /// 画像の挿入先
    #[arg(long, value_enum, default_value_t = PaneArg::Rewritten)]
    pub insert_into: PaneArg,
    /// 原文ペインをロックする
    #[arg(long)]
    pub lock_source: bool,

    /// 結果をクリップボードへ
    #[arg(long)]
    pub copy: bool,
    /// 結果を HTML で表示
    #[arg(long)]
    pub html: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TargetArg {
    Blog,
    Cafe,
}

impl From<TargetArg> for ContentTarget {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Blog => ContentTarget::Blog,
            TargetArg::Cafe => ContentTarget::Cafe,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PaneArg {
    Source,
    Rewritten,
}

impl From<PaneArg> for EditTarget {
    fn from(p: PaneArg) -> Self {
        match p {
            PaneArg::Source => EditTarget::Source,
            PaneArg::Rewritten => EditTarget::Rewritten,
        }
    }
}
