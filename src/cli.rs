use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "event-gallery")]
#[command(about = "イベント写真・動画の共有ギャラリー", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真・動画をアップロード
    Upload {
        /// アップロードするファイル（複数可）
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 投稿者名（省略時は Anonymous）
        #[arg(short, long, default_value = "")]
        name: String,
    },

    /// 合言葉を入力してギャラリーを開錠
    Access,

    /// ギャラリーの一覧を表示
    Gallery,

    /// アセットを削除
    Delete {
        /// アセットID
        #[arg(required = true)]
        id: String,

        /// 確認せずに削除
        #[arg(short, long)]
        yes: bool,
    },

    /// アセットをダウンロード
    Download {
        /// アセットID
        #[arg(required = true)]
        id: String,

        /// 保存先ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// スライドショー表示
    Slideshow {
        /// 開始位置（1始まり）
        #[arg(short, long, default_value = "1")]
        start: usize,

        /// 自動再生で開始
        #[arg(long)]
        play: bool,
    },

    /// ギャラリーをロック（認可を取り消す）
    Lock,

    /// 設定
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
