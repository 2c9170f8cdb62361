use clap::Parser;
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[clap(name="binance-cli")]
#[clap(about="binance-cli lets you query balances, prices, order history and place or cancel spot orders", long_about=None)]
pub struct CommandlineArgs {
    /// Whether or not to execute against testnet
    #[clap(long="testnet")]
    pub testnet: bool,

    /// Log how long each command took to complete
    #[clap(long)]
    pub timing: bool,

    /// Single command to execute then exit, e.g. `binance-cli -- price BTCUSDT`.
    /// Without it, commands are read line by line from stdin.
    #[clap(last=true)]
    pub command: Vec<String>,
}

/// Errors of API related calls & its internal operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad buy/sell syntax
    #[error("failed to parse order arguments: {0}")]
    MalformedOrder(String),

    /// A signed request was built without one of its required parameters
    #[error("missing required parameter `{0}`")]
    MissingParameter(String),

    /// Non-200 response from the exchange
    #[error("{status} [{}] {msg}", .code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()))]
    ExchangeQuery {
        status: u16,
        code: Option<i64>,
        msg: String,
    },

    #[error("environment variable {0} must be set for this command")]
    MissingCredential(&'static str),

    #[error("incorrect parameter value: {0}")]
    IncorrectParameterValue(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("not implemented")]
    NotImplemented,

    #[error("error parsing raw url: {0}")]
    ParsingRawUrl(#[from] url::ParseError),

    #[error("error creating http request: {0}")]
    CreatingHttpRequest(#[from] isahc::http::Error),

    #[error("http transport: {0}")]
    Transport(#[from] isahc::Error),

    #[error("error parsing json: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// `TradingContext` holds what every command needs for the lifetime of the
/// process: credentials and which network to talk to.
pub struct TradingContext {
    /// From BINANCE_API_KEY, or BINANCE_TESTNET_API_KEY with `--testnet`
    pub api_key: Option<String>,

    /// From BINANCE_API_SECRET, or BINANCE_TESTNET_API_SECRET with `--testnet`
    pub api_secret: Option<String>,

    /// Whether or not to execute API against testnet
    pub use_testnet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Market,
    Limit,
    Stop,
    OneCancelsOther,
}

/// Error body returned by the exchange alongside a non-200 status
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

// https://binance-docs.github.io/apidocs/spot/en/#symbol-price-ticker
#[derive(Debug, serde::Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// One entry of the capital coin list. Only the fields we report on.
#[derive(Debug, serde::Deserialize)]
pub struct CoinInformation {
    pub coin: String,
    pub name: String,
    pub free: Decimal,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInformation {
    pub can_trade: bool,
    pub balances: Vec<Balance>,
}

#[derive(Debug, serde::Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

/// Order as listed by open-orders and order-history endpoints
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    pub symbol: String,
    pub order_id: u64,
    pub price: Decimal,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    pub status: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    #[serde(default)]
    pub stop_price: Decimal,
    /// Creation time in ms
    pub time: i64,
}

/// Response of a new order. ACK responses carry no status nor fill
/// information, hence the options.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: String,
    pub transact_time: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoOrderResponse {
    pub order_list_id: i64,
    pub list_status_type: String,
    pub list_order_status: String,
    pub orders: Vec<OcoLeg>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoLeg {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: String,
}

/// Result of a cancel. When cancelling all orders of a symbol, OCO lists come
/// back as a single entry with an `orderListId` and no `orderId`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledOrder {
    pub symbol: String,
    #[serde(default)]
    pub order_id: Option<u64>,
    #[serde(default)]
    pub order_list_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub list_order_status: Option<String>,
}
