#[macro_use]
extern crate log;
extern crate range_dht;
extern crate simplelog;

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::{self, BufRead};

use range_dht::{Action, Message};

/// Characters dropped from the value of a request line.
const CONTROL_CHARS: &[char] = &['\n', '\r', '\t', '\x08'];

/// Parses `<action> <target-address> <key> <value...>` into the target address and the request.
fn parse_line(line: &str) -> Option<(String, Message)> {
    let args: Vec<&str> = line.trim_end().split(' ').collect();
    if args.len() < 4 {
        return None;
    }

    let action = match args[0].parse().ok().and_then(Action::from_code) {
        Some(action) => action,
        None => {
            warn!("Unknown action {:?}", args[0]);
            return None;
        },
    };
    let value = args[3..].join(" ").replace(CONTROL_CHARS, "");
    Some((args[1].to_string(), Message::new(action, args[2], &value)))
}

fn main() {
    if let Err(err) = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("Unable to initialize logger: {}", err);
    }

    let input = io::stdin();
    for line in input.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!("{}", err);
                break;
            },
        };
        let (addr, request) = match parse_line(&line) {
            Some(parsed) => parsed,
            None => continue,
        };

        match request.exchange(&addr) {
            Ok(response) if response.is_error() => warn!("{} answered with an error", addr),
            Ok(response) => info!("{:?}", response),
            Err(err) => warn!("Request to {} failed: {}", addr, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_line;
    use range_dht::{Action, Message};

    #[test]
    fn test_parse_line() {
        let (addr, request) = parse_line("1 127.0.0.1:8900 alice in\twonderland\r\n").unwrap();
        assert_eq!(addr, "127.0.0.1:8900");
        assert_eq!(request, Message::new(Action::Insert, "alice", "inwonderland"));

        let (_, request) = parse_line("3 127.0.0.1:8900 alice x y").unwrap();
        assert_eq!(request, Message::new(Action::Query, "alice", "x y"));
    }

    #[test]
    fn test_parse_line_rejects() {
        assert!(parse_line("3 127.0.0.1:8900 alice").is_none());
        assert!(parse_line("7 127.0.0.1:8900 alice x").is_none());
        assert!(parse_line("query 127.0.0.1:8900 alice x").is_none());
    }
}
