pub mod parcel;
pub mod records;

pub use self::parcel::ParcelId;
pub use self::records::{Indicator, Observation, ParseIndicatorError, WeatherRecord, YieldRecord};
