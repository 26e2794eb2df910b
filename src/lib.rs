/*!
# A dummy HL7 lab analyzer over MLLP.

This crate emulates a laboratory instrument endpoint on an HL7v2 network.
It listens for order messages framed with MLLP (HL7's Minimal Lower Layer
Protocol: a start-of-block byte, the message text, and a two byte
end-of-block marker, over plain TCP), acknowledges each one synchronously,
and parks the extracted order in an in-memory queue awaiting human review.
When a reviewer supplies observation values, it composes an `ORU^R01` result
message and delivers it MLLP-framed to a configured downstream receiver,
waiting up to five seconds for that receiver's acknowledgment.

Nothing here persists: the queue is volatile, there is no redelivery, and a
failed send simply leaves the order pending for another attempt. It is a
test double for a lab analyzer, not a conformant HL7 engine.

## Example

Receiving orders into a shared store:

```no_run
use std::sync::Arc;
use tokio::net::TcpListener;
use hl7_lab_analyzer::ids::UuidIds;
use hl7_lab_analyzer::listener::Listener;
use hl7_lab_analyzer::store::OrderStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(OrderStore::new());
    let socket = TcpListener::bind("0.0.0.0:2575").await?;

    Listener::new(Arc::clone(&store), Arc::new(UuidIds))
        .serve(socket)
        .await?;
    Ok(())
}
```

Resulting a pending order (normally driven by the review workflow):

```no_run
use std::collections::HashMap;
use hl7_lab_analyzer::results::compose_result;
use hl7_lab_analyzer::sender::send_result;
use hl7_lab_analyzer::store::{OrderStatus, OrderStore};

async fn result_first_pending(store: &OrderStore) -> Result<(), Box<dyn std::error::Error>> {
    let order = store.get_pending().into_iter().next().expect("nothing pending");
    let values = HashMap::from([("2345-7".to_string(), 92.0)]);

    let message = compose_result(&order.fields, &values, &HashMap::new())?;
    if send_result("localhost:2577", &message).await {
        store.update_status(order.id, OrderStatus::Processed, Some(message));
    }
    Ok(())
}
```
*/

pub mod ack;
pub mod codec;
pub mod config;
pub mod extract;
pub mod hl7;
pub mod ids;
pub mod listener;
pub mod results;
pub mod sender;
pub mod store;

pub use codec::MllpCodec;
pub use store::{OrderRecord, OrderStatus, OrderStore};
