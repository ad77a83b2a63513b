//! CLI definition using clap

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use shukka_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shukka")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Order, shipment plan and shipment ledger management")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory override
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging, applied on top of RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Contracts (受注)
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Shipment plan board (出荷予定表)
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Shipment ledger (出荷)
    Ship {
        #[command(subcommand)]
        action: ShipAction,
    },

    /// Daily performance report (実績管理表)
    Report {
        /// Report date (YYYY-MM-DD). Defaults to today.
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,

        /// Also export to an Excel file
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// Unit price master (単価マスタ)
    Price {
        #[command(subcommand)]
        action: PriceAction,
    },

    /// Configure settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set session timeout in minutes
        #[arg(long)]
        set_session_timeout: Option<u32>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// Register a new contract
    New {
        /// Contract number (7 digits). Assigned automatically when omitted.
        #[arg(long)]
        issue_no: Option<String>,

        #[command(flatten)]
        fields: OrderArgs,
    },

    /// Replace every field of a contract except its number
    Edit {
        code: String,

        #[command(flatten)]
        fields: OrderArgs,
    },

    /// Copy a contract into its next branch number
    Branch { code: String },

    /// Show one contract
    Show { code: String },

    /// List contracts issued on a date
    List {
        /// Issue date (YYYY-MM-DD). Defaults to today.
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// Search by site name or contract number
    Search { term: String },
}

/// Order fields as command-line flags
#[derive(Args, Debug, Clone)]
pub struct OrderArgs {
    /// Read all fields from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["site", "customer", "product"])]
    pub from_json: Option<PathBuf>,

    /// 現場名
    #[arg(long, required_unless_present = "from_json")]
    pub site: Option<String>,

    /// 現場住所
    #[arg(long, default_value = "")]
    pub address: String,

    /// 得意先
    #[arg(long, required_unless_present = "from_json")]
    pub customer: Option<String>,

    /// 施工者名
    #[arg(long, default_value = "")]
    pub contractor: String,

    /// 担当者名
    #[arg(long)]
    pub coordinator: Option<String>,

    /// 連絡先
    #[arg(long, default_value = "")]
    pub contact: String,

    /// 商品名
    #[arg(long, required_unless_present = "from_json")]
    pub product: Option<String>,

    /// 商品区分
    #[arg(long, default_value = "")]
    pub product_category: String,

    #[arg(long, default_value = "")]
    pub note: String,

    /// 初回出荷予定日
    #[arg(long)]
    pub first_ship_date: Option<NaiveDate>,

    /// 契約数量 (m³)
    #[arg(long, default_value_t = 0.0)]
    pub quantity: f64,

    /// 予定回転数
    #[arg(long, default_value_t = 0)]
    pub rotation: u32,

    /// 販売単価
    #[arg(long, default_value_t = 0)]
    pub price: i64,

    /// 夜間
    #[arg(long)]
    pub night: bool,

    /// 現場試験
    #[arg(long)]
    pub site_test: bool,

    /// 23区外
    #[arg(long)]
    pub outside_zone: bool,

    /// 材料渡し
    #[arg(long)]
    pub material_delivery: bool,

    /// 特記項目
    #[arg(long, default_value = "")]
    pub special_note: String,
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Write one board cell (overwrites the whole cell)
    Set {
        #[arg(long, short = 'd')]
        date: NaiveDate,

        /// Board section (el, other)
        #[arg(long, short = 's')]
        section: String,

        #[arg(long, short = 'r')]
        row: u32,

        /// Contract number; unknown numbers leave the cell unlinked
        #[arg(long, default_value = "")]
        contract: String,

        #[arg(long, default_value = "")]
        site: String,

        #[arg(long, default_value = "")]
        start: String,

        /// Planned quantity; anything non-numeric is stored as empty
        #[arg(long, default_value = "")]
        quantity: String,

        /// Planned truck count; anything non-numeric is stored as empty
        #[arg(long, default_value = "")]
        trucks: String,

        #[arg(long, default_value = "")]
        note: String,
    },

    /// List board cells
    List {
        /// Only this date
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// Remove one board cell
    Clear {
        #[arg(long, short = 'd')]
        date: NaiveDate,

        #[arg(long, short = 's')]
        section: String,

        #[arg(long, short = 'r')]
        row: u32,
    },

    /// Compare planned quantity with the contracted quantity
    Check { code: String },
}

#[derive(Subcommand)]
pub enum ShipAction {
    /// Show the entry defaults for the next vehicle
    Prefill { code: Option<String> },

    /// Record one vehicle's delivery
    Record {
        code: String,

        /// 車両番号
        #[arg(long)]
        vehicle: String,

        /// Quantity in m³. Defaults to the standard load.
        #[arg(long, short = 'q')]
        quantity: Option<f64>,

        /// Defaults to today
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,

        /// HH:MM:SS. Defaults to now.
        #[arg(long, short = 't')]
        time: Option<NaiveTime>,
    },

    /// Running figures and contract details
    Stats {
        code: String,

        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// List recorded shipments of a contract
    List {
        code: String,

        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum PriceAction {
    /// Import a CSV or TOML price list
    Import { path: PathBuf },

    /// List unit prices
    List,

    /// Set one unit price
    Set {
        /// 区分 (昼間/夜間, day/night)
        #[arg(long, short = 'c')]
        category: String,

        /// 項目名, e.g. "昼間 3回転"
        #[arg(long, short = 'i')]
        item: String,

        /// 仕切り価格
        #[arg(long, short = 'p')]
        price: i64,

        /// 標準販売価格
        #[arg(long, default_value_t = 0)]
        standard: i64,
    },
}
