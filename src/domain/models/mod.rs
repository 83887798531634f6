pub mod event;
pub mod instance_data;
pub mod patterns;
pub mod schedule;
pub mod settings;
pub mod tags;

pub use event::{
    Action, ClassifiedEvent, InstanceDetail, Notification, PubSubEnvelope, PubSubMessage,
    PubSubRecord, SPOT_INTERRUPTION_DETAIL_TYPE,
};
pub use instance_data::{InstanceCatalog, InstanceTypeInfo};
pub use patterns::PatternList;
pub use schedule::{FieldSpec, ScheduleInstant, ScheduleState, ScheduleWindow};
pub use settings::{
    BiddingPolicy, ConfigModel, InstanceTerminationMethod, NotificationAction, OnDemandMinimum,
    RawSettings, SpotProductDescription,
};
pub use tags::{TagFilter, TagFilteringMode};
