use std::{
    collections::HashMap,
    sync::{
        mpsc::{channel, Receiver},
        Arc,
    },
};

use tracing::{debug, warn};
use zenoh::{prelude::sync::*, subscriber::Subscriber, Session};

use crate::{errors::Error, message::Message, Result};

/// One input delivered to a node, tagged with the node-local input id.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub message: Message,
}

impl Event {
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            message,
        }
    }
}

/// Where a node's outputs go.
pub trait Outputs {
    fn send_output(&mut self, id: &str, message: Message) -> Result<()>;
}

/// Maps node-local input and output ids onto zenoh key expressions.
#[derive(Debug, Clone, Default)]
pub struct NodeKeys {
    pub inputs: Vec<(String, String)>,
    pub outputs: Vec<(String, String)>,
}

impl NodeKeys {
    pub fn input(mut self, id: &str, key_expr: &str) -> Self {
        self.inputs.push((id.to_owned(), key_expr.to_owned()));
        self
    }

    pub fn output(mut self, id: &str, key_expr: &str) -> Self {
        self.outputs.push((id.to_owned(), key_expr.to_owned()));
        self
    }
}

/// A dataflow node on top of a zenoh session.
///
/// Every subscriber pushes into one channel, so [`Node::recv`] yields a single
/// ordered stream and the caller stays the only owner of its state.
pub struct Node {
    session: Arc<Session>,
    _subscribers: Vec<Subscriber<'static, ()>>,
    outputs: HashMap<String, String>,
    events: Receiver<Event>,
}

impl Node {
    pub fn init(keys: &NodeKeys) -> Result<Self> {
        let session = zenoh::open(config::default()).res()?.into_arc();
        let (tx, events) = channel();

        let mut subscribers = Vec::with_capacity(keys.inputs.len());
        for (id, key_expr) in &keys.inputs {
            let tx = tx.clone();
            let input = id.clone();
            let subscriber = session
                .declare_subscriber(key_expr.clone())
                .callback(move |sample: Sample| {
                    let payload: Vec<u8> = match sample.value.try_into() {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("input `{input}`: unreadable payload: {e}");
                            return;
                        }
                    };
                    match Message::decode(payload) {
                        Ok(message) => {
                            // the receiver only goes away when the node is dropped
                            let _ = tx.send(Event::new(input.clone(), message));
                        }
                        Err(e) => warn!("input `{input}`: {e}"),
                    }
                })
                .res()?;
            debug!("input `{id}` subscribed to `{key_expr}`");
            subscribers.push(subscriber);
        }

        let outputs = keys.outputs.iter().cloned().collect();

        Ok(Self {
            session,
            _subscribers: subscribers,
            outputs,
            events,
        })
    }

    /// Blocks until the next input arrives.
    pub fn recv(&self) -> Option<Event> {
        self.events.recv().ok()
    }
}

impl Outputs for Node {
    fn send_output(&mut self, id: &str, message: Message) -> Result<()> {
        let key_expr = self
            .outputs
            .get(id)
            .ok_or_else(|| Error::UnknownOutput(id.to_owned()))?;
        self.session.put(key_expr.clone(), message.encode()?).res()?;
        Ok(())
    }
}
