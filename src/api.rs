//! Blocking REST client for the spot endpoints the cli uses.
//!
//! Every call is made exactly once. A non-200 answer becomes
//! [`Error::ExchangeQuery`] carrying the exchange's `code` and `msg`.

use crate::defines::*;
use crate::signer::{sign, RequestParams};
use crate::types::*;

use isahc::http::{Method, StatusCode};
use isahc::prelude::*;
use isahc::Request;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Client for the exchange's REST API. Owns the credentials for the process
/// lifetime and is handed to every command.
pub struct Binance {
    ctx: TradingContext,
}

impl Binance {
    pub fn new(ctx: TradingContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &TradingContext {
        &self.ctx
    }

    pub fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.query(&EP_PING, &RequestParams::for_endpoint(&EP_PING))?;
        Ok(())
    }

    pub fn ticker_price(&self, symbol: &str) -> Result<TickerPrice> {
        let params = RequestParams::for_endpoint(&EP_TICKER_PRICE).with("symbol", symbol);
        self.query(&EP_TICKER_PRICE, &params)
    }

    /// Daily snapshot for `account_type`: "SPOT", "MARGIN" or "FUTURES".
    /// Its shape differs per account type so it stays untyped.
    pub fn account_snapshot(&self, account_type: &str) -> Result<serde_json::Value> {
        let params = RequestParams::for_endpoint(&EP_ACCOUNT_SNAPSHOT).with("type", account_type);
        self.query(&EP_ACCOUNT_SNAPSHOT, &params)
    }

    pub fn all_coins(&self) -> Result<Vec<CoinInformation>> {
        self.query(&EP_ALL_COINS, &RequestParams::for_endpoint(&EP_ALL_COINS))
    }

    pub fn account_information(&self) -> Result<AccountInformation> {
        self.query(
            &EP_ACCOUNT_INFORMATION,
            &RequestParams::for_endpoint(&EP_ACCOUNT_INFORMATION),
        )
    }

    /// Open orders of `symbol`, or of every symbol when `None`
    pub fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderReport>> {
        let mut params = RequestParams::for_endpoint(&EP_OPEN_ORDERS);
        if let Some(symbol) = symbol {
            params.push("symbol", symbol);
        }
        self.query(&EP_OPEN_ORDERS, &params)
    }

    pub fn all_orders(&self, symbol: &str) -> Result<Vec<OrderReport>> {
        let params = RequestParams::for_endpoint(&EP_ALL_ORDERS).with("symbol", symbol);
        self.query(&EP_ALL_ORDERS, &params)
    }

    pub fn new_order(&self, params: &RequestParams) -> Result<NewOrderResponse> {
        self.query(&EP_NEW_ORDER, params)
    }

    pub fn new_oco_order(&self, params: &RequestParams) -> Result<OcoOrderResponse> {
        self.query(&EP_NEW_OCO_ORDER, params)
    }

    pub fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<CancelledOrder> {
        let params = RequestParams::for_endpoint(&EP_CANCEL_ORDER)
            .with("symbol", symbol)
            .with("orderId", order_id);
        self.query(&EP_CANCEL_ORDER, &params)
    }

    pub fn cancel_open_orders(&self, symbol: &str) -> Result<Vec<CancelledOrder>> {
        let params = RequestParams::for_endpoint(&EP_CANCEL_OPEN_ORDERS).with("symbol", symbol);
        self.query(&EP_CANCEL_OPEN_ORDERS, &params)
    }

    fn query<T: DeserializeOwned>(&self, endpoint: &Endpoint, params: &RequestParams) -> Result<T> {
        if endpoint.signed {
            self.query_private(endpoint, params)
        } else {
            self.query_public(endpoint, params)
        }
    }

    fn query_public<T: DeserializeOwned>(&self, endpoint: &Endpoint, params: &RequestParams) -> Result<T> {
        params.check_required()?;
        let query = params.query_string();
        debug!(method = %endpoint.method, path = endpoint.path, query = %query, "public request");

        let url = build_url(self.ctx.base_url(), endpoint, &query)?;
        send(endpoint.method, &url, None)
    }

    fn query_private<T: DeserializeOwned>(&self, endpoint: &Endpoint, params: &RequestParams) -> Result<T> {
        let (api_key, secret) = self.ctx.credentials()?;
        debug!(method = %endpoint.method, path = endpoint.path, query = %params.query_string(), "private request");

        let signed = sign(params, secret)?;
        debug!(
            timestamp = signed.timestamp_ms(),
            recv_window = signed.recv_window_ms(),
            params = signed.params().len(),
            signature = signed.signature(),
            "signed request"
        );
        let url = build_url(self.ctx.base_url(), endpoint, &signed.query_string())?;
        send(endpoint.method, &url, Some(api_key))
    }
}

fn build_url(base: &str, endpoint: &Endpoint, query: &str) -> Result<Url> {
    let mut url = Url::parse(base)?.join(endpoint.path)?;
    if !query.is_empty() {
        url.set_query(Some(query));
    }
    Ok(url)
}

fn http_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn send<T: DeserializeOwned>(method: HttpMethod, url: &Url, api_key: Option<&str>) -> Result<T> {
    let mut builder = Request::builder().method(http_method(method)).uri(url.as_str());
    if let Some(api_key) = api_key {
        builder = builder.header(API_KEY_HEADER, api_key);
    }

    let mut response = builder.body(())?.send()?;
    let status = response.status();
    let body = response.text()?;

    if status != StatusCode::OK {
        return Err(exchange_error(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Turn a non-200 answer into [`Error::ExchangeQuery`]. Bodies that are not
/// the exchange's `{"code":..,"msg":..}` are kept verbatim as the message.
fn exchange_error(status: StatusCode, body: &str) -> Error {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => Error::ExchangeQuery {
            status: status.as_u16(),
            code: Some(err.code),
            msg: err.msg,
        },
        Err(_) => {
            let msg = body.trim();
            Error::ExchangeQuery {
                status: status.as_u16(),
                code: None,
                msg: if msg.is_empty() {
                    status.canonical_reason().unwrap_or("").to_string()
                } else {
                    msg.to_string()
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_build_url() {
        let url = build_url(BINANCE_TESTNET_API_ENDPOINT, &EP_TICKER_PRICE, "symbol=BTCUSDT").unwrap();
        assert_eq!(url.as_str(), "https://testnet.binance.vision/api/v3/ticker/price?symbol=BTCUSDT");

        let url = build_url(BINANCE_API_ENDPOINTS[0], &EP_PING, "").unwrap();
        assert_eq!(url.as_str(), "https://api.binance.com/api/v3/ping");
    }

    #[test]
    fn test_build_url_keeps_signed_query_verbatim() {
        let query = "symbol=BTCUSDT&newClientOrderId=a+b%2Fc&timestamp=1&recvWindow=5000&signature=ab12";
        let url = build_url(BINANCE_API_ENDPOINTS[1], &EP_NEW_ORDER, query).unwrap();
        assert_eq!(url.query(), Some(query));
    }

    #[test]
    fn test_exchange_error_with_code() {
        let err = exchange_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":-1121,"msg":"Invalid symbol."}"#,
        );
        match err {
            Error::ExchangeQuery { status, code, msg } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-1121));
                assert_eq!(msg, "Invalid symbol.");
            }
            other => panic!("unexpected {:?}", other),
        }
        let err = exchange_error(StatusCode::BAD_REQUEST, r#"{"code":-1121,"msg":"Invalid symbol."}"#);
        assert_eq!(err.to_string(), "400 [-1121] Invalid symbol.");
    }

    #[test]
    fn test_exchange_error_without_json_body() {
        let err = exchange_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "502 [-] Bad Gateway");

        let err = exchange_error(StatusCode::FORBIDDEN, "<html>waf</html>");
        assert!(matches!(err, Error::ExchangeQuery { code: None, ref msg, .. } if msg == "<html>waf</html>"));
    }

    #[test]
    fn test_decode_ticker_price() {
        let ticker: TickerPrice = serde_json::from_str(r#"{"symbol":"LTCBTC","price":"4.00000200"}"#).unwrap();
        assert_eq!(ticker.symbol, "LTCBTC");
        assert_eq!(ticker.price, dec("4.000002"));
    }

    #[test]
    fn test_decode_coin_list() {
        let body = r#"[{"coin":"BTC","depositAllEnable":true,"free":"0.08074558","freeze":"0.00000000",
            "ipoable":"0.00000000","isLegalMoney":false,"locked":"0.00000000","name":"Bitcoin",
            "networkList":[],"storage":"0.00000000","trading":true,"withdrawAllEnable":true,
            "withdrawing":"0.00000000"}]"#;
        let coins: Vec<CoinInformation> = serde_json::from_str(body).unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].coin, "BTC");
        assert_eq!(coins[0].name, "Bitcoin");
        assert_eq!(coins[0].free, dec("0.08074558"));
    }

    #[test]
    fn test_decode_account_information() {
        let body = r#"{"makerCommission":15,"canTrade":true,"canWithdraw":true,
            "balances":[{"asset":"BTC","free":"4723846.89208129","locked":"0.00000000"},
                        {"asset":"LTC","free":"4763368.68006011","locked":"1.5"}]}"#;
        let info: AccountInformation = serde_json::from_str(body).unwrap();
        assert!(info.can_trade);
        assert_eq!(info.balances.len(), 2);
        assert_eq!(info.balances[1].locked, dec("1.5"));
    }

    #[test]
    fn test_decode_order_report() {
        let body = r#"[{"symbol":"LTCBTC","orderId":1,"orderListId":-1,"clientOrderId":"myOrder1",
            "price":"0.1","origQty":"1.0","executedQty":"0.0","cummulativeQuoteQty":"0.0",
            "status":"NEW","timeInForce":"GTC","type":"LIMIT","side":"BUY","stopPrice":"0.0",
            "icebergQty":"0.0","time":1499827319559,"updateTime":1499827319559,"isWorking":true}]"#;
        let orders: Vec<OrderReport> = serde_json::from_str(body).unwrap();
        let order = &orders[0];
        assert_eq!(order.order_id, 1);
        assert_eq!(order.order_type, "LIMIT");
        assert_eq!(order.side, "BUY");
        assert_eq!(order.price, dec("0.1"));
        assert_eq!(order.stop_price, Decimal::ZERO);
        assert_eq!(order.time, 1_499_827_319_559);
    }

    #[test]
    fn test_decode_new_order_ack_and_full() {
        let ack: NewOrderResponse = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","orderId":28,"orderListId":-1,"clientOrderId":"6gCrw2kRUAF9CvJDGP16IP","transactTime":1507725176595}"#,
        )
        .unwrap();
        assert_eq!(ack.order_id, 28);
        assert_eq!(ack.status, None);

        let full: NewOrderResponse = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","orderId":28,"orderListId":-1,"clientOrderId":"x","transactTime":1507725176595,
                "price":"0.00000000","origQty":"10.00000000","executedQty":"10.00000000","status":"FILLED",
                "type":"MARKET","side":"SELL","fills":[]}"#,
        )
        .unwrap();
        assert_eq!(full.status.as_deref(), Some("FILLED"));
        assert_eq!(full.executed_qty, Some(dec("10")));
    }

    #[test]
    fn test_decode_oco_response() {
        let body = r#"{"orderListId":0,"contingencyType":"OCO","listStatusType":"EXEC_STARTED",
            "listOrderStatus":"EXECUTING","listClientOrderId":"JYVpp3F0f5CAG15DhtrqLp",
            "transactionTime":1563417480525,"symbol":"LTCBTC",
            "orders":[{"symbol":"LTCBTC","orderId":2,"clientOrderId":"Kk7sqHb9J6mJWTMDVW7Vos"},
                      {"symbol":"LTCBTC","orderId":3,"clientOrderId":"xTXKaGYd4bluPVp78IVRvl"}]}"#;
        let oco: OcoOrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(oco.order_list_id, 0);
        assert_eq!(oco.list_order_status, "EXECUTING");
        assert_eq!(oco.orders.iter().map(|o| o.order_id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_decode_cancel_all_mixed() {
        let body = r#"[{"symbol":"BTCUSDT","origClientOrderId":"E6APeyTJvkMvLMYMqu1KQ4","orderId":11,
            "orderListId":-1,"clientOrderId":"pXLV6Hz6mprAcVYpVMTGgx","price":"0.089853","origQty":"0.178622",
            "executedQty":"0.000000","cummulativeQuoteQty":"0.000000","status":"CANCELED",
            "timeInForce":"GTC","type":"LIMIT","side":"BUY"},
            {"orderListId":1929,"contingencyType":"OCO","listStatusType":"ALL_DONE",
            "listOrderStatus":"ALL_DONE","listClientOrderId":"2inzWQdDvZLHbbAmAozX2N",
            "transactionTime":1585230948299,"symbol":"BTCUSDT","orders":[]}]"#;
        let cancelled: Vec<CancelledOrder> = serde_json::from_str(body).unwrap();
        assert_eq!(cancelled[0].order_id, Some(11));
        assert_eq!(cancelled[0].status.as_deref(), Some("CANCELED"));
        assert_eq!(cancelled[1].order_id, None);
        assert_eq!(cancelled[1].order_list_id, Some(1929));
        assert_eq!(cancelled[1].list_order_status.as_deref(), Some("ALL_DONE"));
    }

    #[test]
    fn test_only_market_data_is_unsigned() {
        for endpoint in [EP_PING, EP_TICKER_PRICE] {
            assert!(!endpoint.signed, "{}", endpoint.path);
        }
        for endpoint in [
            EP_ACCOUNT_SNAPSHOT,
            EP_ALL_COINS,
            EP_ACCOUNT_INFORMATION,
            EP_OPEN_ORDERS,
            EP_ALL_ORDERS,
            EP_NEW_ORDER,
            EP_NEW_OCO_ORDER,
            EP_CANCEL_ORDER,
            EP_CANCEL_OPEN_ORDERS,
        ] {
            assert!(endpoint.signed, "{}", endpoint.path);
        }
    }

    #[test]
    fn test_private_call_without_credentials() {
        let client = Binance::new(TradingContext {
            api_key: None,
            api_secret: None,
            use_testnet: true,
        });
        assert!(matches!(
            client.account_information(),
            Err(Error::MissingCredential(ENV_TESTNET_API_KEY))
        ));
    }
}
