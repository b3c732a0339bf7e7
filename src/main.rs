//! Inspection tool for MAP manager bus traffic.
//!
//! Decodes hex-encoded frames captured from the platform bus and prints the
//! header and, for asynchronous events, the decoded body.

mod cli;

use clap::Parser;
use mapm::{
    MapEvent,
    message::{Message, connection::ClientRegistration, function},
};

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err("odd number of hex digits".to_owned());
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(pair, 16).map_err(|e| format!("invalid hex `{pair}`: {e}"))
        })
        .collect()
}

fn describe(message: &Message) -> String {
    let header = message.header();
    let name = function::name(header.message_function).unwrap_or("UNKNOWN");
    let mut out = format!(
        "{name} ({:#010x})\n  address_id: {}\n  message_id: {:#x}{}\n  group: {:#x}\n  length: {}\n",
        header.message_function,
        header.address_id,
        header.message_id,
        if message.is_response() { " (response)" } else { "" },
        header.message_group,
        header.message_length,
    );
    let body = if header.message_function == function::CLIENT_REGISTRATION {
        message.parse::<ClientRegistration>().map(|b| format!("{b:#?}"))
    } else if message.is_response() {
        Ok(format!("{} response bytes", message.payload().len()))
    } else {
        match MapEvent::decode(message) {
            Some(event) => event.map(|e| format!("{e:#?}")),
            None => Ok(format!("{} request bytes", message.payload().len())),
        }
    };
    match body {
        Ok(text) => out.push_str(&text),
        Err(e) => out.push_str(&format!("malformed body: {e}")),
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The library never installs a subscriber; the binary does.
    tracing_subscriber::fmt::init();

    match cli::Cli::parse().command {
        cli::Command::Decode { frame } => {
            let bytes = parse_hex(&frame)?;
            let message = Message::decode(&bytes)?;
            println!("{}", describe(&message));
        }
        cli::Command::Functions => {
            for (code, name) in function::ALL {
                println!("{code:#010x}  {name}");
            }
        }
    }
    Ok(())
}
