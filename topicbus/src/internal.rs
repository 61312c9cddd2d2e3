mod broker;
mod command;
mod handler;
mod registry;
mod subscription;
mod worker;

pub(crate) use broker::Broker;
pub(crate) use command::WorkerCommand;
pub(crate) use handler::{Handler, TypedHandler};
pub(crate) use registry::Registry;
pub(crate) use subscription::Subscription;
pub(crate) use worker::{CommandReceiver, WorkerHandle};
