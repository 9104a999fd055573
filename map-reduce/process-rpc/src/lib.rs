// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod error;
pub use error::RpcError;

pub mod rpc;
pub use rpc::{MasterRequest, MasterResponse, WorkerRequest, WorkerResponse};

pub mod framing;

mod registration_server;
pub use registration_server::{RegisteredWorkers, RegistrationServer};

mod rpc_invoker;
pub use rpc_invoker::RpcInvoker;

mod worker_server;
pub use worker_server::{TaskHandler, WorkerServer};

mod simulated_handler;
pub use simulated_handler::SimulatedHandler;

mod master;
pub use master::Master;
