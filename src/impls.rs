use crate::types::*;
use crate::defines::*;

use rand::seq::SliceRandom;
use std::fmt;

impl TradingContext {
    /// Read credentials for the chosen network from the environment.
    /// Absent credentials are not an error here, only private commands need them.
    pub fn from_env(use_testnet: bool) -> TradingContext {
        let (key_var, secret_var) = if use_testnet {
            (ENV_TESTNET_API_KEY, ENV_TESTNET_API_SECRET)
        } else {
            (ENV_API_KEY, ENV_API_SECRET)
        };

        TradingContext {
            api_key: std::env::var(key_var).ok().filter(|v| !v.is_empty()),
            api_secret: std::env::var(secret_var).ok().filter(|v| !v.is_empty()),
            use_testnet,
        }
    }

    /// Api key and secret, or which environment variable is missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let (key_var, secret_var) = if self.use_testnet {
            (ENV_TESTNET_API_KEY, ENV_TESTNET_API_SECRET)
        } else {
            (ENV_API_KEY, ENV_API_SECRET)
        };

        let key = self.api_key.as_deref().ok_or(Error::MissingCredential(key_var))?;
        let secret = self.api_secret.as_deref().ok_or(Error::MissingCredential(secret_var))?;
        Ok((key, secret))
    }

    /// Host to send the next request to. Mainnet spreads requests across its
    /// mirror hosts.
    pub fn base_url(&self) -> &'static str {
        if self.use_testnet {
            BINANCE_TESTNET_API_ENDPOINT
        } else {
            BINANCE_API_ENDPOINTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(BINANCE_API_ENDPOINTS[0])
        }
    }
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        })
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderKind::Market => "MARKET",
            OrderKind::Limit => "LIMIT",
            OrderKind::Stop => "STOP",
            OrderKind::OneCancelsOther => "OCO",
        })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        })
    }
}
