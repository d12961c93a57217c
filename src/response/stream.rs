pub use ws::Ws;

mod ws;
