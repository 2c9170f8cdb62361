//! Order command parser.
//!
//! Turns the arguments of `buy`/`sell`, e.g. `BTCUSDT limit=42000.5 $100`,
//! into a [`TradeIntent`]. Grammar of the order spec:
//!
//! - `market`
//! - `limit=PRICE`
//! - `stop=STOP,STOP_LIMIT`
//! - `oco=LIMIT,STOP,STOP_LIMIT`
//!
//! The size spec is a token quantity, or a quote-currency amount when
//! prefixed with `$`.

use crate::defines::PRICE_DECIMAL_PLACES;
use crate::types::{Error, OrderKind, Result};

use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static ORDER_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(limit|stop|oco)=([^=]+)$").expect("order spec regex"));

/// Validated buy/sell request, as typed by the user.
///
/// Prices that do not apply to `kind` are `None`, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    ticker: String,
    kind: OrderKind,
    limit_price: Option<Decimal>,
    stop_price: Option<Decimal>,
    stop_limit_price: Option<Decimal>,
    size: Decimal,
    size_is_notional: bool,
}

impl TradeIntent {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn limit_price(&self) -> Option<Decimal> {
        self.limit_price
    }

    pub fn stop_price(&self) -> Option<Decimal> {
        self.stop_price
    }

    pub fn stop_limit_price(&self) -> Option<Decimal> {
        self.stop_limit_price
    }

    /// Token quantity, or quote amount when [`Self::size_is_notional`]
    pub fn size(&self) -> Decimal {
        self.size
    }

    pub fn size_is_notional(&self) -> bool {
        self.size_is_notional
    }
}

impl fmt::Display for TradeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ticker, self.kind)?;
        if let Some(p) = self.limit_price {
            write!(f, " limit={}", p)?;
        }
        if let Some(p) = self.stop_price {
            write!(f, " stop={}", p)?;
        }
        if let Some(p) = self.stop_limit_price {
            write!(f, " stop_limit={}", p)?;
        }
        if self.size_is_notional {
            write!(f, " position=$ {}", self.size)
        } else {
            write!(f, " position={}", self.size)
        }
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedOrder(reason.into())
}

/// Parse `[ticker, orderSpec, sizeSpec]` into a [`TradeIntent`].
///
/// Any problem yields a single [`Error::MalformedOrder`], nothing partial.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<TradeIntent> {
    let [ticker, order_spec, size_spec] = tokens else {
        return Err(malformed(format!(
            "expected TICKER ORDERSPEC SIZESPEC, got {} argument(s)",
            tokens.len()
        )));
    };

    let ticker = ticker.as_ref().trim();
    if ticker.is_empty() {
        return Err(malformed("empty ticker"));
    }

    let (kind, limit_price, stop_price, stop_limit_price) = parse_order_spec(order_spec.as_ref())?;
    let (size, size_is_notional) = parse_size_spec(size_spec.as_ref())?;

    Ok(TradeIntent {
        ticker: ticker.to_ascii_uppercase(),
        kind,
        limit_price,
        stop_price,
        stop_limit_price,
        size,
        size_is_notional,
    })
}

type OrderSpec = (OrderKind, Option<Decimal>, Option<Decimal>, Option<Decimal>);

fn parse_order_spec(spec: &str) -> Result<OrderSpec> {
    if spec == "market" {
        return Ok((OrderKind::Market, None, None, None));
    }

    let caps = ORDER_SPEC_RE
        .captures(spec)
        .ok_or_else(|| malformed(format!("invalid order type `{}`", spec)))?;

    let prices = caps[2]
        .split(',')
        .map(parse_positive)
        .collect::<Result<Vec<_>>>()?;

    match (&caps[1], prices.as_slice()) {
        ("limit", [limit]) => Ok((OrderKind::Limit, Some(*limit), None, None)),
        ("stop", [stop, stop_limit]) => Ok((OrderKind::Stop, None, Some(*stop), Some(*stop_limit))),
        ("oco", [limit, stop, stop_limit]) => Ok((
            OrderKind::OneCancelsOther,
            Some(*limit),
            Some(*stop),
            Some(*stop_limit),
        )),
        (kind, _) => Err(malformed(format!(
            "wrong number of prices for `{}`: {}",
            kind,
            prices.len()
        ))),
    }
}

fn parse_size_spec(spec: &str) -> Result<(Decimal, bool)> {
    match spec.strip_prefix('$') {
        Some(amount) => Ok((parse_positive(amount)?, true)),
        None => Ok((parse_positive(spec)?, false)),
    }
}

fn parse_positive(raw: &str) -> Result<Decimal> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| malformed(format!("invalid number `{}`", raw)))?;
    if value <= Decimal::ZERO {
        return Err(malformed(format!("expected a positive number, got `{}`", raw)));
    }
    // anything finer would be rounded away when sent to the exchange
    if value.normalize().scale() > PRICE_DECIMAL_PLACES as u32 {
        return Err(malformed(format!(
            "more than {} decimal places in `{}`",
            PRICE_DECIMAL_PLACES, raw
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_market_in_tokens() {
        let intent = parse(&["BTCUSDT", "market", "1.5"]).unwrap();
        assert_eq!(intent.ticker(), "BTCUSDT");
        assert_eq!(intent.kind(), OrderKind::Market);
        assert_eq!(intent.size(), dec("1.5"));
        assert!(!intent.size_is_notional());
        assert_eq!(intent.limit_price(), None);
        assert_eq!(intent.stop_price(), None);
        assert_eq!(intent.stop_limit_price(), None);
    }

    #[test]
    fn test_limit_notional() {
        let intent = parse(&["ETHUSDT", "limit=2500.12345678", "$100"]).unwrap();
        assert_eq!(intent.kind(), OrderKind::Limit);
        assert_eq!(intent.limit_price(), Some(dec("2500.12345678")));
        assert_eq!(intent.stop_price(), None);
        assert_eq!(intent.stop_limit_price(), None);
        assert_eq!(intent.size(), dec("100"));
        assert!(intent.size_is_notional());
    }

    #[test]
    fn test_stop() {
        let intent = parse(&["BTCUSDT", "stop=100,90", "2"]).unwrap();
        assert_eq!(intent.kind(), OrderKind::Stop);
        assert_eq!(intent.stop_price(), Some(dec("100")));
        assert_eq!(intent.stop_limit_price(), Some(dec("90")));
        assert_eq!(intent.limit_price(), None);
    }

    #[test]
    fn test_oco() {
        let intent = parse(&["X", "oco=1,2,3", "1"]).unwrap();
        assert_eq!(intent.kind(), OrderKind::OneCancelsOther);
        assert_eq!(intent.limit_price(), Some(dec("1")));
        assert_eq!(intent.stop_price(), Some(dec("2")));
        assert_eq!(intent.stop_limit_price(), Some(dec("3")));
        assert_eq!(intent.size(), dec("1"));
    }

    #[test]
    fn test_ticker_is_uppercased() {
        let intent = parse(&["btcusdt".to_string(), "market".to_string(), "1".to_string()]).unwrap();
        assert_eq!(intent.ticker(), "BTCUSDT");
    }

    #[test]
    fn test_display() {
        let intent = parse(&["BTCUSDT", "oco=3,2,1", "$50"]).unwrap();
        assert_eq!(intent.to_string(), "BTCUSDT OCO limit=3 stop=2 stop_limit=1 position=$ 50");

        let intent = parse(&["BTCUSDT", "market", "0.5"]).unwrap();
        assert_eq!(intent.to_string(), "BTCUSDT MARKET position=0.5");
    }

    #[rstest]
    #[case(&["BTCUSDT", "bogus", "1"])]
    #[case(&["BTCUSDT", "Market", "1"])]
    #[case(&["BTCUSDT", "limit", "1"])]
    #[case(&["BTCUSDT", "limit=", "1"])]
    #[case(&["BTCUSDT", "limit=abc", "1"])]
    #[case(&["BTCUSDT", "limit=1,2", "1"])]
    #[case(&["BTCUSDT", "limit=1=2", "1"])]
    #[case(&["BTCUSDT", "stop=100", "1"])]
    #[case(&["BTCUSDT", "stop=100,", "1"])]
    #[case(&["BTCUSDT", "oco=1,2", "1"])]
    #[case(&["BTCUSDT", "trail=1", "1"])]
    #[case(&["BTCUSDT", "market", "0"])]
    #[case(&["BTCUSDT", "market", "-1"])]
    #[case(&["BTCUSDT", "limit=-5", "1"])]
    #[case(&["BTCUSDT", "market", "$"])]
    #[case(&["BTCUSDT", "market", "$$5"])]
    #[case(&["BTCUSDT", "market", "nan"])]
    #[case(&["BTCUSDT", "limit=0.000000004", "1"])]
    #[case(&["BTCUSDT", "limit=2500.123456785", "1"])]
    #[case(&["BTCUSDT", "oco=3,2,1.000000001", "1"])]
    #[case(&["BTCUSDT", "market", "0.000000001"])]
    #[case(&["BTCUSDT", "market"])]
    #[case(&["BTCUSDT"])]
    #[case(&[])]
    #[case(&["BTCUSDT", "market", "1", "extra"])]
    fn test_rejects_malformed(#[case] tokens: &[&str]) {
        assert!(matches!(parse(tokens), Err(Error::MalformedOrder(_))));
    }

    #[test]
    fn test_eight_decimals_accepted() {
        let intent = parse(&["BTCUSDT", "limit=0.00000001", "1.500000000000"]).unwrap();
        assert_eq!(intent.limit_price(), Some(dec("0.00000001")));
        assert_eq!(intent.size(), dec("1.5"));
    }

    #[test]
    fn test_unset_fields_follow_kind() {
        let cases = [
            ("market", (false, false, false)),
            ("limit=1", (true, false, false)),
            ("stop=2,1", (false, true, true)),
            ("oco=3,2,1", (true, true, true)),
        ];
        for (spec, (limit, stop, stop_limit)) in cases {
            let intent = parse(&["BNBUSDT", spec, "1"]).unwrap();
            assert_eq!(intent.limit_price().is_some(), limit, "{}", spec);
            assert_eq!(intent.stop_price().is_some(), stop, "{}", spec);
            assert_eq!(intent.stop_limit_price().is_some(), stop_limit, "{}", spec);
        }
    }
}
