use crate::api::Binance;
use crate::defines::{EP_NEW_OCO_ORDER, EP_NEW_ORDER};
use crate::order::{self, TradeIntent};
use crate::signer::RequestParams;
use crate::types::*;
use crate::util::round_qty;

use rust_decimal::Decimal;
use std::time::Instant;
use tracing::info;

/// One line of user input, validated.
#[derive(Debug, PartialEq)]
pub enum Command {
    Account,
    Price(String),
    Status,
    Balances,
    OrderHistory(String),
    Order(Side, TradeIntent),
    Cancel { symbol: String, order_id: u64 },
    CancelSymbol(String),
    CancelAll,
    Ping,
}

impl Command {
    /// Parse space-separated tokens. A blank line gives `Ok(None)`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Option<Command>> {
        let Some((cmd, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let arg = |i: usize, usage: &'static str| -> Result<String> {
            args.get(i)
                .map(|s| s.as_ref().to_ascii_uppercase())
                .ok_or(Error::Usage(usage))
        };

        let command = match cmd.as_ref() {
            "account" => Command::Account,
            "price" => Command::Price(arg(0, "price SYMBOL")?),
            "status" => Command::Status,
            "balances" => Command::Balances,
            "oh" => Command::OrderHistory(arg(0, "oh SYMBOL")?),
            "buy" => Command::Order(Side::Buy, order::parse(args)?),
            "sell" => Command::Order(Side::Sell, order::parse(args)?),
            "cancel" => {
                const USAGE: &str = "cancel SYMBOL ORDERID | cancel SYMBOL ALL | cancel ALL";
                let symbol = arg(0, USAGE)?;
                if symbol == "ALL" {
                    Command::CancelAll
                } else {
                    let order_id = arg(1, USAGE)?;
                    if order_id == "ALL" {
                        Command::CancelSymbol(symbol)
                    } else {
                        let order_id = order_id.parse::<u64>().map_err(|_| {
                            Error::IncorrectParameterValue(format!("order id `{}`", order_id))
                        })?;
                        Command::Cancel { symbol, order_id }
                    }
                }
            }
            "ping" => Command::Ping,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Parse and run one command line.
pub fn execute_command<S: AsRef<str>>(client: &Binance, tokens: &[S]) -> Result<()> {
    match Command::from_tokens(tokens)? {
        Some(command) => execute(client, &command),
        None => Ok(()),
    }
}

pub fn execute(client: &Binance, command: &Command) -> Result<()> {
    match command {
        Command::Account => cmd_account(client),
        Command::Price(symbol) => cmd_market_price(client, symbol),
        Command::Status => cmd_status(client),
        Command::Balances => cmd_balances(client),
        Command::OrderHistory(symbol) => cmd_order_history(client, symbol),
        Command::Order(side, intent) => cmd_order(client, *side, intent),
        Command::Cancel { symbol, order_id } => cmd_order_cancel_id(client, symbol, *order_id),
        Command::CancelSymbol(symbol) => cmd_order_cancel_all_symbol(client, symbol),
        Command::CancelAll => cmd_order_cancel_all(),
        Command::Ping => cmd_ping(client),
    }
}

fn cmd_account(client: &Binance) -> Result<()> {
    let snapshot = client.account_snapshot("SPOT")?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn cmd_market_price(client: &Binance, symbol: &str) -> Result<()> {
    let ticker = client.ticker_price(symbol)?;
    println!("{}", ticker.price.normalize());
    Ok(())
}

fn cmd_status(client: &Binance) -> Result<()> {
    println!("Equity:");
    for coin in client.all_coins()?.iter().filter(|c| !c.free.is_zero()) {
        println!("{} {} {}", coin.coin, coin.name, coin.free.normalize());
    }

    println!("Open orders:");
    println!("symbol order_id type price stop_price qty status");
    for order in client.open_orders(None)? {
        println!("{}", format_open_order(&order));
    }
    Ok(())
}

fn cmd_balances(client: &Binance) -> Result<()> {
    let account = client.account_information()?;
    if !account.can_trade {
        info!("trading is disabled on this account");
    }
    println!("asset free locked");
    for balance in account
        .balances
        .iter()
        .filter(|b| !(b.free.is_zero() && b.locked.is_zero()))
    {
        println!("{} {} {}", balance.asset, balance.free.normalize(), balance.locked.normalize());
    }
    Ok(())
}

fn cmd_order_history(client: &Binance, symbol: &str) -> Result<()> {
    let orders = client.all_orders(symbol)?;
    println!("Order history of {}:", symbol);
    println!("order_id side type price qty executed status time");
    for order in &orders {
        println!("{}", format_history_order(order));
    }
    Ok(())
}

fn cmd_order(client: &Binance, side: Side, intent: &TradeIntent) -> Result<()> {
    info!("cmd order {} : {}", side, intent);

    // notional sizes are resolved against the price right before submission
    let quantity = if intent.size_is_notional() {
        let ticker = client.ticker_price(intent.ticker())?;
        let quantity = notional_to_quantity(intent.size(), ticker.price)?;
        info!(symbol = %ticker.symbol, price = %ticker.price, quantity = %quantity, "converted $ {} to token quantity", intent.size());
        quantity
    } else {
        intent.size()
    };

    let params = order_params(side, intent, quantity)?;
    match intent.kind() {
        OrderKind::OneCancelsOther => {
            let placed = client.new_oco_order(&params)?;
            println!(
                "order list {} {} {}",
                placed.order_list_id, placed.list_status_type, placed.list_order_status
            );
            for leg in &placed.orders {
                println!("  order {} {} {}", leg.order_id, leg.symbol, leg.client_order_id);
            }
        }
        _ => {
            let placed = client.new_order(&params)?;
            info!(
                client_order_id = %placed.client_order_id,
                transact_time = placed.transact_time,
                "order placed"
            );
            println!("{}", format_placed(&placed));
        }
    }
    Ok(())
}

fn cmd_order_cancel_id(client: &Binance, symbol: &str, order_id: u64) -> Result<()> {
    info!("canceling order {} on {}", order_id, symbol);
    let cancelled = client.cancel_order(symbol, order_id)?;
    println!("{}", cancelled.status.as_deref().unwrap_or("UNKNOWN"));
    Ok(())
}

fn cmd_order_cancel_all_symbol(client: &Binance, symbol: &str) -> Result<()> {
    info!("canceling all orders on {}!", symbol);
    for cancelled in client.cancel_open_orders(symbol)? {
        println!("{}", format_cancelled(&cancelled));
    }
    Ok(())
}

fn cmd_order_cancel_all() -> Result<()> {
    Err(Error::NotImplemented)
}

fn cmd_ping(client: &Binance) -> Result<()> {
    let start = Instant::now();
    client.ping()?;
    println!("pong ({} ms)", start.elapsed().as_millis());
    Ok(())
}

/// Token quantity worth `notional` at `price`, rounded by [`round_qty`].
pub fn notional_to_quantity(notional: Decimal, price: Decimal) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(Error::IncorrectParameterValue(format!("market price {}", price)));
    }
    let quantity = notional.checked_div(price).map(round_qty).ok_or_else(|| {
        Error::IncorrectParameterValue(format!("$ {} at {} overflows the quantity", notional, price))
    })?;
    if quantity <= Decimal::ZERO {
        return Err(Error::IncorrectParameterValue(format!(
            "$ {} buys less than the smallest quantity at {}",
            notional, price
        )));
    }
    Ok(quantity)
}

fn required_price(price: Option<Decimal>, key: &str) -> Result<Decimal> {
    price.ok_or_else(|| Error::MissingParameter(key.to_string()))
}

/// Exchange parameters for placing `intent` with an already resolved token
/// `quantity`.
pub fn order_params(side: Side, intent: &TradeIntent, quantity: Decimal) -> Result<RequestParams> {
    let quantity = quantity.normalize();
    let params = match intent.kind() {
        OrderKind::Market => RequestParams::for_endpoint(&EP_NEW_ORDER)
            .with("symbol", intent.ticker())
            .with("side", side.as_str())
            .with("type", "MARKET")
            .with("quantity", quantity),
        OrderKind::Limit => RequestParams::for_endpoint(&EP_NEW_ORDER)
            .with("symbol", intent.ticker())
            .with("side", side.as_str())
            .with("type", "LIMIT")
            .with("timeInForce", "GTC")
            .with("quantity", quantity)
            .with_price("price", required_price(intent.limit_price(), "price")?),
        OrderKind::Stop => RequestParams::for_endpoint(&EP_NEW_ORDER)
            .with("symbol", intent.ticker())
            .with("side", side.as_str())
            .with("type", "STOP_LOSS_LIMIT")
            .with("timeInForce", "GTC")
            .with("quantity", quantity)
            .with_price("price", required_price(intent.stop_limit_price(), "price")?)
            .with_price("stopPrice", required_price(intent.stop_price(), "stopPrice")?),
        OrderKind::OneCancelsOther => RequestParams::for_endpoint(&EP_NEW_OCO_ORDER)
            .with("symbol", intent.ticker())
            .with("side", side.as_str())
            .with("quantity", quantity)
            .with_price("price", required_price(intent.limit_price(), "price")?)
            .with_price("stopPrice", required_price(intent.stop_price(), "stopPrice")?)
            .with_price(
                "stopLimitPrice",
                required_price(intent.stop_limit_price(), "stopLimitPrice")?,
            )
            .with("stopLimitTimeInForce", "GTC"),
    };
    Ok(params)
}

fn format_open_order(order: &OrderReport) -> String {
    format!(
        "{} {} {} {} {} {} {}",
        order.symbol,
        order.order_id,
        order.order_type,
        order.price.normalize(),
        order.stop_price.normalize(),
        order.orig_qty.normalize(),
        order.status
    )
}

fn format_history_order(order: &OrderReport) -> String {
    let time = chrono::DateTime::from_timestamp_millis(order.time)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| order.time.to_string());
    format!(
        "{} {} {} {} {} {} {} {}",
        order.order_id,
        order.side,
        order.order_type,
        order.price.normalize(),
        order.orig_qty.normalize(),
        order.executed_qty.normalize(),
        order.status,
        time
    )
}

fn format_placed(placed: &NewOrderResponse) -> String {
    let status = placed.status.as_deref().unwrap_or("ACK");
    match placed.executed_qty {
        Some(executed) => format!(
            "order {} {} {} executed={}",
            placed.order_id,
            placed.symbol,
            status,
            executed.normalize()
        ),
        None => format!("order {} {} {}", placed.order_id, placed.symbol, status),
    }
}

fn format_cancelled(cancelled: &CancelledOrder) -> String {
    match (cancelled.order_id, cancelled.order_list_id) {
        (Some(order_id), _) => format!(
            "order {} -> {}",
            order_id,
            cancelled.status.as_deref().unwrap_or("UNKNOWN")
        ),
        (None, Some(list_id)) => format!(
            "order list {} -> {}",
            list_id,
            cancelled.list_order_status.as_deref().unwrap_or("UNKNOWN")
        ),
        (None, None) => format!("{} -> UNKNOWN", cancelled.symbol),
    }
}
