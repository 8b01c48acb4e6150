//! Built-in nets.

use crate::config::LinkPolicy;
use crate::core::CpNet;
use crate::error::NetError;
use crate::operations::{add_variable, create_variable, insert_variable, link, set_preference};
use crate::preference::Preference;

/// Name of the single variable in [`fresh`].
pub const ROOT_NODE: &str = "root node";

/// The four-variable example net.
///
/// Weather and Time condition the choice of Activity, which in turn
/// conditions the choice of Friend:
///
/// | Variable | Leaves |
/// |---|---|
/// | Weather | Fair > Rain |
/// | Time | Afternoon > Morning |
/// | Activity | Afternoon, Fair: Cycling > TableTennis; otherwise TableTennis > Cycling |
/// | Friend | Cycling: Emily > Henry; TableTennis: Henry > Emily |
pub fn weather_example() -> Result<CpNet, NetError> {
    let mut net = CpNet::new();
    let weather = insert_variable(&mut net, "Weather", ["Fair", "Rain"])?;
    let time = insert_variable(&mut net, "Time", ["Afternoon", "Morning"])?;
    let activity = insert_variable(&mut net, "Activity", ["Cycling", "TableTennis"])?;
    let friend = insert_variable(&mut net, "Friend", ["Emily", "Henry"])?;

    let policy = LinkPolicy::acyclic();
    link(&mut net, time, activity, &policy)?;
    link(&mut net, weather, activity, &policy)?;
    link(&mut net, activity, friend, &policy)?;

    let first = || Preference::strict([0, 1]);
    let second = || Preference::strict([1, 0]);
    set_preference(&mut net, weather, &[], first())?;
    set_preference(&mut net, time, &[], first())?;
    // conditions are (Time, Weather)
    set_preference(&mut net, activity, &[0, 0], first())?;
    set_preference(&mut net, activity, &[0, 1], second())?;
    set_preference(&mut net, activity, &[1, 0], second())?;
    set_preference(&mut net, activity, &[1, 1], second())?;
    set_preference(&mut net, friend, &[0], first())?;
    set_preference(&mut net, friend, &[1], second())?;
    Ok(net)
}

/// A net holding one placeholder variable.
pub fn fresh() -> Result<CpNet, NetError> {
    let mut net = CpNet::new();
    let root = create_variable(&mut net, ROOT_NODE)?;
    add_variable(&mut net, root)?;
    Ok(net)
}
