pub mod memory;
pub mod models;
pub mod mongo;
pub mod repository;

pub use memory::MemoryStore;
pub use models::{verify_against_dummy, Investigator, Report, ReportCase, ThreadItem};
pub use mongo::MongoDbContext;
pub use repository::{
    CaseStore, InvestigatorStore, ReportStore, Repositories, StoreHealth, ThreadStore,
};
