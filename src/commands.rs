use crate::analysis::AnalysisEngine;
use crate::domain::AlertCondition;
use crate::price::MarketDataFetcher;
use crate::store::AlertStore;
use crate::utils::format_usd;
use std::fmt::Write as _;
use std::sync::Arc;

/// A parsed chat command. Argument validation happens at dispatch so the
/// reply can point at the exact problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Analyze(Option<String>),
    Trends,
    SetAlert(Vec<String>),
    MyAlerts,
    RemoveAlert(Option<String>),
    Chat(String),
}

pub fn parse(text: &str) -> Command {
    let mut parts = text.trim().split_whitespace();
    match parts.next() {
        Some("/start") => Command::Start,
        Some("/help") => Command::Help,
        Some("/analyze") => Command::Analyze(parts.next().map(|s| s.to_uppercase())),
        Some("/trends") => Command::Trends,
        Some("/setalert") => Command::SetAlert(parts.map(String::from).collect()),
        Some("/myalerts") => Command::MyAlerts,
        Some("/removealert") => Command::RemoveAlert(parts.next().map(String::from)),
        _ => Command::Chat(text.trim().to_string()),
    }
}

/// Executes chat commands against the alert store, the market data fetcher,
/// and the advisory stub, returning the reply text (Telegram HTML).
pub struct CommandHandler {
    store: AlertStore,
    fetcher: Arc<MarketDataFetcher>,
    analysis: AnalysisEngine,
}

impl CommandHandler {
    pub fn new(store: AlertStore, fetcher: Arc<MarketDataFetcher>, analysis: AnalysisEngine) -> Self {
        Self {
            store,
            fetcher,
            analysis,
        }
    }

    pub async fn handle(&self, user_id: i64, text: &str) -> String {
        match parse(text) {
            Command::Start => welcome_text(),
            Command::Help => help_text(),
            Command::Analyze(symbol) => self.analyze(symbol).await,
            Command::Trends => self.trends(),
            Command::SetAlert(args) => self.set_alert(user_id, &args),
            Command::MyAlerts => self.my_alerts(user_id),
            Command::RemoveAlert(arg) => self.remove_alert(user_id, arg),
            Command::Chat(message) => small_talk(&message),
        }
    }

    async fn analyze(&self, symbol: Option<String>) -> String {
        let Some(symbol) = symbol else {
            return "Please specify a cryptocurrency. Example: /analyze BTC".to_string();
        };

        let data = self.fetcher.market_data(&symbol).await;
        let analysis = self.analysis.analyze(&symbol);

        format!(
            "📊 <b>{symbol} Analysis Report</b>\n\n\
             {}\n\n\
             <b>Current Price:</b> ${}\n\
             <b>24h Change:</b> {:.2}%\n\
             <b>Market Sentiment:</b> {}\n\n\
             <b>Key Indicators:</b>\n\
             • RSI: {:.2} (Neutral)\n\
             • Trend: {}\n\n\
             <b>AI Prediction:</b>\n{}\n\n\
             <b>Confidence Level:</b> {}%",
            analysis.summary,
            format_usd(data.price),
            data.change_24h,
            analysis.sentiment,
            analysis.rsi,
            analysis.trend,
            analysis.prediction,
            analysis.confidence
        )
    }

    fn trends(&self) -> String {
        let trends = self.analysis.market_trends();

        let mut response = format!(
            "🌐 <b>Current Market Trends</b>\n\n\
             <b>Overall Sentiment:</b> {}\n\
             <b>Top Gainers (24h):</b>\n",
            trends.market_sentiment
        );
        for (i, (symbol, change)) in trends.top_gainers.iter().enumerate() {
            let _ = writeln!(response, "{}. {}: +{:.2}%", i + 1, symbol, change);
        }
        response.push_str("\n<b>Top Losers (24h):</b>\n");
        for (i, (symbol, change)) in trends.top_losers.iter().enumerate() {
            let _ = writeln!(response, "{}. {}: {:.2}%", i + 1, symbol, change);
        }
        let _ = write!(response, "\n<b>AI Insights:</b>\n{}", trends.insights);
        response
    }

    fn set_alert(&self, user_id: i64, args: &[String]) -> String {
        if args.len() < 3 {
            return "Please specify alert parameters. Example: /setalert BTC above 50000\n\
                    Format: /setalert [coin] [above/below] [price]"
                .to_string();
        }

        let symbol = args[0].to_uppercase();
        let Some(condition) = AlertCondition::parse(&args[1]) else {
            return "Condition must be 'above' or 'below'".to_string();
        };
        let threshold = match args[2].parse::<f64>() {
            Ok(value) if value > 0.0 && value.is_finite() => value,
            _ => return "Please enter a valid price number".to_string(),
        };

        let alert_id = self.store.add(user_id, &symbol, condition, threshold);

        format!(
            "✅ Alert set successfully!\n\
             <b>ID:</b> {alert_id}\n\
             <b>Coin:</b> {symbol}\n\
             <b>Condition:</b> Price {condition} ${}",
            format_usd(threshold)
        )
    }

    fn my_alerts(&self, user_id: i64) -> String {
        let alerts = self.store.alerts_for(user_id);
        if alerts.is_empty() {
            return "You don't have any active alerts.".to_string();
        }

        let mut response = String::from("🔔 <b>Your Active Alerts</b>\n\n");
        for alert in alerts {
            let _ = write!(
                response,
                "<b>ID:</b> {}\n\
                 <b>Coin:</b> {}\n\
                 <b>Condition:</b> Price {} ${}\n\
                 <b>Created:</b> {}\n\n",
                alert.id,
                alert.symbol,
                alert.condition,
                format_usd(alert.threshold),
                alert.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        response
    }

    fn remove_alert(&self, user_id: i64, arg: Option<String>) -> String {
        let Some(raw) = arg else {
            return "Please specify an alert ID. Example: /removealert 123".to_string();
        };
        let Ok(alert_id) = raw.parse::<u64>() else {
            return "Please enter a valid alert ID (number)".to_string();
        };

        if self.store.remove(user_id, alert_id) {
            format!("✅ Alert {alert_id} removed successfully!")
        } else {
            "Alert not found or you don't have permission to remove it.".to_string()
        }
    }
}

fn welcome_text() -> String {
    "🤖 Welcome to the Crypto Alert Bot!\n\n\
     I watch cryptocurrency prices and ping you when your alert conditions fire.\n\n\
     Available commands:\n\
     /analyze - Analyze a specific cryptocurrency\n\
     /trends - Show current market trends\n\
     /setalert - Set a price alert\n\
     /myalerts - View your active alerts\n\
     /removealert - Remove an alert\n\
     /help - Show help information"
        .to_string()
}

fn help_text() -> String {
    "📖 <b>How to use the Crypto Alert Bot</b>\n\n\
     <b>Commands:</b>\n\
     /analyze [coin] - Analyze a cryptocurrency (e.g., /analyze BTC)\n\
     /trends - Get current market trends and insights\n\
     /setalert [coin] [above/below] [price] - Set a price alert\n   \
     Example: /setalert BTC above 50000\n\
     /myalerts - View your active alerts\n\
     /removealert [id] - Remove an alert by ID"
        .to_string()
}

fn small_talk(message: &str) -> String {
    let lower = message.to_lowercase();
    if ["hello", "hi", "hey", "greetings"]
        .iter()
        .any(|g| lower.contains(g))
    {
        "Hello! I'm the Crypto Alert Bot. Use /help to see what I can do!".to_string()
    } else if lower.contains("thank") {
        "You're welcome! 😊".to_string()
    } else {
        "I'm not sure how to respond to that. Use /help to see available commands.".to_string()
    }
}
