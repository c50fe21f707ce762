use std::{env, sync::Arc, time::Duration};

use abci_client::{new_client, types::*, Context, Result};

/// Drives a counter ABCI application (e.g., `abci-cli counter`) through a few blocks
///
/// Usage: `cargo run --example counter_client -- [address] [transport]`
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let address = args
        .next()
        .unwrap_or_else(|| "tcp://127.0.0.1:26658".to_owned());
    let transport = args.next().unwrap_or_else(|| "socket".to_owned());

    let client = new_client(&address, &transport, true).await?;

    client.set_response_callback(Arc::new(|_: &Request, response: &Response| {
        if let Some(ResponseValue::DeliverTx(ref deliver_tx)) = response.value {
            if deliver_tx.code != 0 {
                println!("Transaction rejected: {}", deliver_tx.log);
            }
        }
    }));

    let ctx = Context::with_timeout(Duration::from_secs(10));

    let echo = client.echo_sync(&ctx, "hello").await?;
    println!("Echo: {}", echo.message);

    let info = client.info_sync(&ctx, Default::default()).await?;
    println!("Last block height: {}", info.last_block_height);

    let mut counter = 0u64;

    for height in info.last_block_height + 1..=info.last_block_height + 3 {
        let header = Header {
            height,
            ..Default::default()
        };

        client
            .begin_block_sync(
                &ctx,
                RequestBeginBlock {
                    header: Some(header),
                    ..Default::default()
                },
            )
            .await?;

        // Transactions are pipelined; responses are handled by the response callback
        for _ in 0..5 {
            counter += 1;
            client.deliver_tx_async(RequestDeliverTx {
                tx: counter.to_be_bytes().to_vec(),
            })?;
        }

        client.end_block_sync(&ctx, RequestEndBlock { height }).await?;

        let commit = client.commit_sync(&ctx).await?;
        println!("Committed block {} with app hash {:?}", height, commit.data);
    }

    client.stop();

    Ok(())
}
