//! Text command grammar.

use crate::model::OrderId;

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `start`, `merhaba`, `başlat`
    Help,
    /// `stop`, `bitir`, `hoşçakal`
    StopAll,
    /// `listele`, `liste`, `sırala`
    List,
    /// `durum`, `bilgi`
    StatusAll,
    /// `<n> iptal`
    Stop(OrderId),
    /// `<n> durum`
    Status(OrderId),
    /// `<n>`
    Start(OrderId),
    Unknown,
}

impl Command {
    /// Parses a message. Case and surrounding whitespace are ignored.
    ///
    /// Order numbers must parse as a signed 64-bit integer; the text itself is
    /// kept as the id, so leading zeros survive.
    pub fn parse(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        match text.as_str() {
            "start" | "merhaba" | "başlat" => return Command::Help,
            "stop" | "bitir" | "hoşçakal" => return Command::StopAll,
            "listele" | "liste" | "sırala" => return Command::List,
            "durum" | "bilgi" => return Command::StatusAll,
            _ => {}
        }

        let parts: Vec<&str> = text.split_whitespace().collect();
        match parts.as_slice() {
            [n, "iptal"] if is_order_number(n) => Command::Stop(OrderId::from(*n)),
            [n, "durum"] if is_order_number(n) => Command::Status(OrderId::from(*n)),
            [n] if is_order_number(n) => Command::Start(OrderId::from(*n)),
            _ => Command::Unknown,
        }
    }
}

fn is_order_number(text: &str) -> bool {
    text.parse::<i64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(Command::parse("Merhaba"), Command::Help);
        assert_eq!(Command::parse("  BAŞLAT "), Command::Help);
        assert_eq!(Command::parse("hoşçakal"), Command::StopAll);
        assert_eq!(Command::parse("Liste"), Command::List);
        assert_eq!(Command::parse("bilgi"), Command::StatusAll);
    }

    #[test]
    fn test_order_commands() {
        assert_eq!(Command::parse("123"), Command::Start(OrderId::from("123")));
        assert_eq!(Command::parse("0042"), Command::Start(OrderId::from("0042")));
        assert_eq!(Command::parse("123 iptal"), Command::Stop(OrderId::from("123")));
        assert_eq!(Command::parse("123  DURUM"), Command::Status(OrderId::from("123")));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Command::parse(""), Command::Unknown);
        assert_eq!(Command::parse("abc"), Command::Unknown);
        assert_eq!(Command::parse("abc iptal"), Command::Unknown);
        assert_eq!(Command::parse("123 sil"), Command::Unknown);
        assert_eq!(Command::parse("123 iptal şimdi"), Command::Unknown);
        assert_eq!(Command::parse("99999999999999999999"), Command::Unknown);
    }
}
