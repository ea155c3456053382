use async_trait::async_trait;

use crate::BotState;
use crate::error::BotError;
use crate::handlers;
use crate::models::OrderAction;
use crate::telegram::InlineKeyboard;

/// Reply surface handed to handlers, one per inbound event.
///
/// The transport decides what "edit" means; for button presses it rewrites
/// the message the button was attached to, for plain commands it falls
/// back to a new message. Tests substitute a recording mock.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn reply(&self, text: &str) -> Result<(), BotError>;

    async fn reply_with_keyboard(
        &self,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<(), BotError>;

    async fn edit(&self, text: &str, keyboard: Option<InlineKeyboard>) -> Result<(), BotError>;
}

/// Who sent the event and where the answer goes.
#[derive(Debug, Clone, Copy)]
pub struct EventContext {
    pub user_id: i64,
    pub chat_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Quote,
    Order,
    Buy,
    Sell,
    Orders,
    Portfolio,
    Positions,
    Balance,
    Movers,
    Gainers,
    Losers,
    Alert,
    Alerts,
    DelAlert,
    Watchlist,
    AddWatch,
    DelWatch,
    News,
}

impl Command {
    /// Parses `/name@bot arg…` into a command and its raw arguments.
    /// Plain text and unknown command names yield None.
    pub fn parse(text: &str) -> Option<(Command, Vec<String>)> {
        let rest = text.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;

        // group chats append the bot's username: /quote@SomeBot AAPL
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        let cmd = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "quote" | "q" => Command::Quote,
            "order" => Command::Order,
            "buy" => Command::Buy,
            "sell" => Command::Sell,
            "orders" => Command::Orders,
            "portfolio" => Command::Portfolio,
            "positions" => Command::Positions,
            "balance" => Command::Balance,
            "movers" => Command::Movers,
            "gainers" => Command::Gainers,
            "losers" => Command::Losers,
            "alert" => Command::Alert,
            "alerts" => Command::Alerts,
            "delalert" => Command::DelAlert,
            "watchlist" => Command::Watchlist,
            "addwatch" => Command::AddWatch,
            "delwatch" => Command::DelWatch,
            "news" => Command::News,
            _ => return None,
        };

        Some((cmd, parts.map(|s| s.to_string()).collect()))
    }

    fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Quote => "quote",
            Command::Order => "order",
            Command::Buy => "buy",
            Command::Sell => "sell",
            Command::Orders => "orders",
            Command::Portfolio => "portfolio",
            Command::Positions => "positions",
            Command::Balance => "balance",
            Command::Movers => "movers",
            Command::Gainers => "gainers",
            Command::Losers => "losers",
            Command::Alert => "alert",
            Command::Alerts => "alerts",
            Command::DelAlert => "delalert",
            Command::Watchlist => "watchlist",
            Command::AddWatch => "addwatch",
            Command::DelWatch => "delwatch",
            Command::News => "news",
        }
    }
}

pub async fn dispatch_command(
    state: &BotState,
    ctx: EventContext,
    text: &str,
    reply: &dyn ReplyChannel,
) {
    let Some((cmd, args)) = Command::parse(text) else {
        return;
    };

    if !state.auth.is_authorized(ctx.user_id) {
        // only the entry command announces the denial; everything else
        // pretends the bot heard nothing
        if matches!(cmd, Command::Start | Command::Help) {
            if let Err(e) = reply.reply("❌ You are not authorized to use this bot.").await {
                tracing::warn!(user_id = ctx.user_id, error = %e, "denial reply failed");
            }
        } else {
            tracing::warn!(
                user_id = ctx.user_id,
                command = cmd.name(),
                "unauthorized command dropped"
            );
        }
        return;
    }

    let result = match cmd {
        Command::Start | Command::Help => handlers::base::start(reply).await,
        Command::Quote => handlers::quotes::quote(state, &args, reply).await,
        Command::Order => handlers::orders::order_menu(reply).await,
        Command::Buy => {
            handlers::orders::quick_order(state, ctx, &args, OrderAction::Buy, reply).await
        }
        Command::Sell => {
            handlers::orders::quick_order(state, ctx, &args, OrderAction::Sell, reply).await
        }
        Command::Orders => handlers::orders::recent_orders(state, reply).await,
        Command::Portfolio | Command::Balance => handlers::portfolio::summary(state, reply).await,
        Command::Positions => handlers::portfolio::positions(state, reply).await,
        Command::Movers => handlers::movers::movers(state, &args, reply).await,
        Command::Gainers | Command::Losers => handlers::movers::deprecated(reply).await,
        Command::Alert => handlers::alerts::create(state, ctx, &args, reply).await,
        Command::Alerts => handlers::alerts::list(state, ctx, reply).await,
        Command::DelAlert => handlers::alerts::delete(state, ctx, &args, reply).await,
        Command::Watchlist => handlers::watchlist::show(state, ctx, reply).await,
        Command::AddWatch => handlers::watchlist::add(state, ctx, &args, reply).await,
        Command::DelWatch => handlers::watchlist::remove(state, ctx, &args, reply).await,
        Command::News => handlers::news::news(&args, reply).await,
    };

    if let Err(e) = result {
        report_error(ctx, cmd.name(), e, reply).await;
    }
}

/// Button presses carry a `<domain>_<action>[_<param>…]` token. The domain
/// prefix picks the handler; the handler parses the rest. Tokens from an
/// older bot build fall through without a reply.
pub async fn dispatch_callback(
    state: &BotState,
    ctx: EventContext,
    data: &str,
    reply: &dyn ReplyChannel,
) {
    if !state.auth.is_authorized(ctx.user_id) {
        tracing::warn!(user_id = ctx.user_id, "unauthorized callback dropped");
        return;
    }

    let result = if data.starts_with("order_") {
        handlers::orders::handle_callback(state, ctx, data, reply).await
    } else if data.starts_with("portfolio_") {
        handlers::portfolio::handle_callback(state, data, reply).await
    } else if data.starts_with("alert_") {
        handlers::alerts::handle_callback(data, reply).await
    } else if data.starts_with("watch_") {
        handlers::watchlist::handle_callback(state, ctx, data, reply).await
    } else if data.starts_with("quote_") {
        handlers::quotes::handle_callback(state, data, reply).await
    } else {
        tracing::debug!(user_id = ctx.user_id, data, "unknown callback domain ignored");
        Ok(())
    };

    if let Err(e) = result {
        report_error(ctx, "callback", e, reply).await;
    }
}

/// Single conversion point from handler errors to user-visible text.
/// Nothing a handler returns escapes the dispatch.
async fn report_error(ctx: EventContext, what: &str, err: BotError, reply: &dyn ReplyChannel) {
    let text = match &err {
        BotError::Validation(msg) | BotError::NotFound(msg) => msg.clone(),
        BotError::Market(e) => {
            tracing::warn!(
                user_id = ctx.user_id,
                command = what,
                error = %e,
                "market data unavailable"
            );
            "❌ Market data is unavailable right now. Please try again later.".to_string()
        }
        _ => {
            tracing::error!(
                user_id = ctx.user_id,
                command = what,
                error = %err,
                "handler failed"
            );
            "❌ Something went wrong. Please try again.".to_string()
        }
    };

    if let Err(e) = reply.reply(&text).await {
        tracing::warn!(user_id = ctx.user_id, error = %e, "error reply delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("/start"), Some((Command::Start, vec![])));
        assert_eq!(Command::parse("  /help  "), Some((Command::Help, vec![])));
        assert_eq!(
            Command::parse("/quote AAPL"),
            Some((Command::Quote, vec!["AAPL".to_string()]))
        );
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(
            Command::parse("/q tsla"),
            Some((Command::Quote, vec!["tsla".to_string()]))
        );
    }

    #[test]
    fn strips_bot_username_suffix() {
        assert_eq!(
            Command::parse("/quote@StockBot AAPL"),
            Some((Command::Quote, vec!["AAPL".to_string()]))
        );
    }

    #[test]
    fn collects_multiple_args() {
        assert_eq!(
            Command::parse("/alert AAPL 150.00"),
            Some((
                Command::Alert,
                vec!["AAPL".to_string(), "150.00".to_string()]
            ))
        );
    }

    #[test]
    fn ignores_unknown_and_plain_text() {
        assert_eq!(Command::parse("/frobnicate"), None);
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(Command::parse("/QUOTE AAPL").map(|(c, _)| c), Some(Command::Quote));
    }
}
