use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use futures::stream;
use http_body_util::BodyExt;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use trickle::escape::{AllowList, Escaper};
use trickle::{
    css, fallback, fallback_with, html, unsafe_html, BodyMode, Config, Content, Html, HtmlResponse,
};

/// Renders a demo page and writes the body to stdout as it is produced.
#[derive(Debug, Parser)]
struct Args {
    /// Produce the whole page before writing anything.
    #[arg(long)]
    buffered: bool,

    /// Let a few harmless tags through in slot values.
    #[arg(long)]
    allow_tags: bool,

    /// Delay between list items, in milliseconds.
    #[arg(long, default_value_t = 300)]
    delay: u64,
}

fn style() -> Html {
    css!("body {{ font-family: sans-serif; }} li {{ margin: {}em; }}", 0.5)
}

fn items(delay: u64) -> Content {
    Content::stream(stream::unfold(1, move |i| async move {
        if i > 5 {
            return None;
        }
        sleep(Duration::from_millis(delay)).await;
        Some((Ok::<_, anyhow::Error>(html!("<li>Item #{i}</li>")), i + 1))
    }))
}

fn comments() -> Content {
    Content::async_producer(|| async {
        sleep(Duration::from_millis(100)).await;
        anyhow::Result::<Content>::Err(anyhow::anyhow!("comment service unavailable"))
    })
}

fn page(delay: u64) -> Html {
    let title = "Streaming <em>lists</em> & friends";
    html!(
        "<!DOCTYPE html><html><head><title>{title}</title><style>{}</style></head>\
         <body><h1>{title}</h1><ul>{}</ul>{}<section>{}</section>{}</body></html>\n",
        style(),
        items(delay),
        unsafe_html("<hr>"),
        fallback_with(comments(), |error| html!("<p class=\"error\">{}</p>", error.to_string())),
        fallback(None::<&str>, html!("never shown")),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config {
        body: if args.buffered {
            BodyMode::Buffered
        } else {
            BodyMode::Streaming
        },
        escape: if args.allow_tags {
            Escaper::AllowList(AllowList::default())
        } else {
            Escaper::Entities
        },
        ..Config::default()
    };
    tracing::info!(?config, "rendering demo page");

    let response = HtmlResponse::with_config(page(args.delay), config).into_http();
    for (name, value) in response.headers() {
        eprintln!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }

    let mut body = response.into_body();
    let mut out = tokio::io::stdout();
    while let Some(frame) = body.frame().await {
        let frame = frame.context("rendering demo page")?;
        if let Ok(data) = frame.into_data() {
            out.write_all(&data).await?;
            out.flush().await?;
        }
    }
    Ok(())
}
