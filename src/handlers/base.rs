use crate::error::BotError;
use crate::router::ReplyChannel;

const WELCOME: &str = "🤖 Stock Trading Bot

📊 Quotes & Data:
/quote SYMBOL - get a stock quote
/movers [INDEX] - market movers

💼 Portfolio:
/portfolio - portfolio summary
/positions - current positions
/balance - account balance

🛒 Trading:
/order - place an order
/buy SYMBOL SHARES - quick buy
/sell SYMBOL SHARES - quick sell
/orders - recent orders

🔔 Alerts:
/alert SYMBOL PRICE - price alert
/alerts - list alerts
/delalert ID - delete alert

👀 Watchlist:
/watchlist - show watchlist
/addwatch SYMBOL - add to watchlist
/delwatch SYMBOL - remove from watchlist

📰 News:
/news SYMBOL - symbol news

⚠️ Educational use only. Verify all trades.";

/// `/start` and `/help` both land here.
pub async fn start(reply: &dyn ReplyChannel) -> Result<(), BotError> {
    reply.reply(WELCOME).await
}
