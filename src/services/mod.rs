pub mod data_source;
pub mod envelope;
pub mod live;
pub mod mock;
pub mod poller;
pub mod transport;

pub use data_source::AssetDataSource;
pub use live::LiveDataSource;
pub use mock::{MockDataSource, MockLatency};
pub use poller::{PollPolicy, SummaryPoller};
pub use transport::HttpTransport;
