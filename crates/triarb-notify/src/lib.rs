//! Triarb Notify
//!
//! The notification-bot collaborator contract: `send_deal` and
//! `send_message`. The concrete chat integration (Telegram) is out of scope
//! for this system's core (a real user-facing bot is an external
//! collaborator), but the trait boundary and a couple of testable
//! implementations are ambient stack that has to exist regardless.

use std::time::Duration;

use triarb_core::Deal;

/// Callback the engine invokes once per accepted deal, and for ad-hoc
/// operator messages (startup, shutdown, fatal errors).
pub trait Notifier: Send + Sync {
    fn send_deal(&self, deal: &Deal, age: Duration);
    fn send_message(&self, text: &str);
}

/// Discards everything. Used where no notification channel is configured
/// (`TELEGRAM.TOKEN`/`USER_ID` absent from the config file).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send_deal(&self, _deal: &Deal, _age: Duration) {}
    fn send_message(&self, _text: &str) {}
}

/// Logs every notification at `info` instead of sending it anywhere. Used
/// in tests and as a visible stand-in before a real chat integration is
/// wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_deal(&self, deal: &Deal, age: Duration) {
        log::info!(
            "deal accepted: cycle={} start_qty={} expected_profit={:.4}% age={}ms",
            deal.cycle_id,
            deal.start_qty,
            deal.expected_profit * rust_decimal::Decimal::ONE_HUNDRED,
            age.as_millis()
        );
    }

    fn send_message(&self, text: &str) {
        log::info!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use triarb_core::{Action, CycleId, TradeDirection};

    fn sample_deal() -> Deal {
        Deal::new(
            CycleId("USDT:BTCUSDT:ETHBTC:ETHUSDT".to_string()),
            dec!(100),
            dec!(0.02),
            chrono::Utc::now(),
            [
                Action::new("BTCUSDT", TradeDirection::Buy, dec!(0.002)),
                Action::new("ETHBTC", TradeDirection::Buy, dec!(0.04)),
                Action::new("ETHUSDT", TradeDirection::Sell, dec!(0.04)),
            ],
        )
    }

    #[test]
    fn noop_notifier_does_not_panic() {
        let _ = env_logger::try_init();
        let notifier = NoopNotifier;
        notifier.send_deal(&sample_deal(), Duration::from_millis(5));
        notifier.send_message("hello");
    }

    #[test]
    fn log_notifier_does_not_panic() {
        let notifier = LogNotifier;
        notifier.send_deal(&sample_deal(), Duration::from_millis(5));
        notifier.send_message("hello");
    }
}
