use clap::Parser;
use common::{
    config::load_config,
    herald_err, logging,
    protocol::{Request, Response},
    utils::errors::{HeraldError, HeraldErrorKind},
};

use crate::{
    cli::{Cli, Commands},
    connection::ClientConnection,
    render::{event_line, payload_line},
};

mod cli;
mod connection;
mod render;

#[tokio::main]
async fn main() -> Result<(), HeraldError> {
    let cli = Cli::parse();
    logging::init("warn")?;

    let socket_path = match cli.socket {
        Some(path) => path,
        None => load_config()?.socket_path,
    };
    let mut client = ClientConnection::new(&socket_path).await?;

    match cli.command {
        Commands::Ping => {
            let resp = client.send(Request::Ping).await?;
            expect(resp, |r| matches!(r, Response::Pong))?;
            println!("pong");
        }
        Commands::Active => match client.send(Request::ActiveNotifications).await? {
            Response::Notifications(payloads) => {
                for payload in &payloads {
                    if cli.json {
                        println!("{}", to_json(payload)?);
                    } else {
                        println!("{}", payload_line(payload));
                    }
                }
            }
            other => return Err(unexpected(other)),
        },
        Commands::Watch => {
            let resp = client.send(Request::Subscribe).await?;
            expect(resp, |r| matches!(r, Response::Ok))?;
            loop {
                match client.recv().await? {
                    Response::Event(event) if cli.json => println!("{}", to_json(&event)?),
                    Response::Event(event) => println!("{}", event_line(&event)),
                    other => return Err(unexpected(other)),
                }
            }
        }
        Commands::Reply { id, message } => {
            let message = message.join(" ");
            match client.send(Request::Reply { id, message }).await? {
                Response::Replied(true) => println!("reply sent"),
                Response::Replied(false) => {
                    return Err(herald_err!(
                        HeraldErrorKind::ReplySend,
                        "notification {} has no reply action",
                        id
                    ));
                }
                other => return Err(unexpected(other)),
            }
        }
        Commands::Dismiss { id } => {
            let resp = client.send(Request::Dismiss { id }).await?;
            expect(resp, |r| matches!(r, Response::Ok))?;
        }
    }
    Ok(())
}

fn expect(resp: Response, ok: impl Fn(&Response) -> bool) -> Result<(), HeraldError> {
    if ok(&resp) { Ok(()) } else { Err(unexpected(resp)) }
}

fn unexpected(resp: Response) -> HeraldError {
    match resp {
        Response::Error(message) => herald_err!(HeraldErrorKind::InvalidData, message),
        other => herald_err!(
            HeraldErrorKind::InvalidData,
            "unexpected response: {:?}",
            other
        ),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, HeraldError> {
    serde_json::to_string(value).map_err(|e| herald_err!(HeraldErrorKind::Serialize, e.to_string()))
}
