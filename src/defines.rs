/// Mainnet REST hosts, one is picked at random per request.
pub const BINANCE_API_ENDPOINTS: [&str; 4] = [
    "https://api.binance.com",
    "https://api1.binance.com",
    "https://api2.binance.com",
    "https://api3.binance.com",
];

/// Spot testnet REST host
pub const BINANCE_TESTNET_API_ENDPOINT: &str = "https://testnet.binance.vision";

pub const ENV_API_KEY: &str = "BINANCE_API_KEY";
pub const ENV_API_SECRET: &str = "BINANCE_API_SECRET";
pub const ENV_TESTNET_API_KEY: &str = "BINANCE_TESTNET_API_KEY";
pub const ENV_TESTNET_API_SECRET: &str = "BINANCE_TESTNET_API_SECRET";

/// Header carrying the api-key on every private endpoint
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Maximum allowed skew (ms) between request timestamp and server time
pub const RECV_WINDOW_MS: u64 = 5000;

/// Decimal places used when formatting price-valued parameters
pub const PRICE_DECIMAL_PLACES: usize = 8;

pub const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// REST endpoint description.
///
/// `required` lists the parameter keys the signed request builder refuses to
/// go without.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
    pub signed: bool,
    pub required: &'static [&'static str],
}

pub const EP_PING: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/api/v3/ping",
    signed: false,
    required: &[],
};

pub const EP_TICKER_PRICE: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/api/v3/ticker/price",
    signed: false,
    required: &["symbol"],
};

pub const EP_ACCOUNT_SNAPSHOT: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/sapi/v1/accountSnapshot",
    signed: true,
    required: &["type"],
};

pub const EP_ALL_COINS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/sapi/v1/capital/config/getall",
    signed: true,
    required: &[],
};

pub const EP_ACCOUNT_INFORMATION: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/api/v3/account",
    signed: true,
    required: &[],
};

pub const EP_OPEN_ORDERS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/api/v3/openOrders",
    signed: true,
    required: &[],
};

pub const EP_ALL_ORDERS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/api/v3/allOrders",
    signed: true,
    required: &["symbol"],
};

pub const EP_NEW_ORDER: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/api/v3/order",
    signed: true,
    required: &["symbol", "side", "type", "quantity"],
};

pub const EP_NEW_OCO_ORDER: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/api/v3/order/oco",
    signed: true,
    required: &["symbol", "side", "quantity", "price", "stopPrice"],
};

pub const EP_CANCEL_ORDER: Endpoint = Endpoint {
    method: HttpMethod::Delete,
    path: "/api/v3/order",
    signed: true,
    required: &["symbol", "orderId"],
};

pub const EP_CANCEL_OPEN_ORDERS: Endpoint = Endpoint {
    method: HttpMethod::Delete,
    path: "/api/v3/openOrders",
    signed: true,
    required: &["symbol"],
};
