//! cpnet: an editing engine for Conditional Preference Networks.
//!
//! A CP-net is a directed graph of preference variables. Each variable has a
//! finite domain and a conditional preference table (CPT) holding one
//! ranking of that domain for every combination of its parents' values.
//!
//! This crate keeps those tables consistent while the net is edited:
//! - linking and unlinking variables grows and collapses the child's CPT,
//!   refusing cycles and enforcing an in-degree bound when asked to;
//! - changing a domain rewrites the variable's own rankings and re-lays the
//!   matching dimension in every child;
//! - parents are kept in name order, so table layout depends only on names;
//! - vacuous ("degenerate") parents can be detected under a cost cap;
//! - nets read from and write to the textual preference-specification format.
//!
//! # Citations
//! - Boutilier, Brafman, Domshlak, Hoos, Poole, "CP-nets: A Tool for Representing and
//!   Reasoning with Conditional Ceteris Paribus Preference Statements", JAIR 21 (2004)
//!
//! # Example
//!
//! ```
//! use cpnet::prelude::*;
//!
//! let mut net = CpNet::new();
//! let weather = insert_variable(&mut net, "Weather", ["Fair", "Rain"]).unwrap();
//! let activity = insert_variable(&mut net, "Activity", ["Cycling", "Chess"]).unwrap();
//! link(&mut net, weather, activity, &LinkPolicy::acyclic()).unwrap();
//!
//! // domains are sorted: Weather = [Fair, Rain], Activity = [Chess, Cycling]
//! // when it rains, Cycling > Chess
//! set_preference(&mut net, activity, &[1], Preference::strict([1, 0])).unwrap();
//! assert_eq!(net.variable(activity).unwrap().cpt_len(), 2);
//!
//! let text = encode(&net);
//! let decoded = decode(&text).unwrap();
//! assert!(decoded.is_clean());
//! assert_eq!(net_fingerprint(&decoded.net), net_fingerprint(&net));
//! ```

pub mod arena;
pub mod cache;
pub mod codec;
pub mod config;
pub mod core;
pub mod cpt;
pub mod degeneracy;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod operations;
pub mod preference;
pub mod presets;
pub mod snapshot;
pub mod variable;

pub use crate::arena::VariableId;
pub use crate::core::CpNet;
pub use crate::degeneracy::Degeneracy;
pub use crate::domain::Domain;
pub use crate::error::{CodecError, DecodeIssue, LinkError, NameError, NetError};
pub use crate::preference::{Preference, Ranked, Relation};
pub use crate::variable::Variable;

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::arena::VariableId;
    pub use crate::codec::{decode, encode, Decoded};
    pub use crate::config::{LinkPolicy, NetConfig};
    pub use crate::core::CpNet;
    pub use crate::cpt::{Condition, Cpt, CptEntry};
    pub use crate::degeneracy::{
        degenerate_parents, is_parent_degenerate, verdict_with_config, Degeneracy,
    };
    pub use crate::domain::{Domain, DomainRemap};
    pub use crate::error::{
        CodecError, ConfigError, CptError, DecodeIssue, LinkError, NameError, NetError,
        PreferenceError, SnapshotError,
    };
    pub use crate::fingerprint::{net_fingerprint, HashValue, SaveState};
    pub use crate::operations::{
        add_variable, create_variable, destroy, has_cycle, insert_variable, is_cyclic, link,
        link_with_config, preference, rename, set_domain, set_preference, unlink, LinkOutcome,
    };
    pub use crate::preference::{Preference, Ranked, Relation};
    pub use crate::presets::{fresh, weather_example};
    pub use crate::snapshot::NetSnapshot;
    pub use crate::variable::Variable;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    const WEATHER_DOCUMENT: &str = "<?xml version='1.0' encoding='us-ascii'?>
<PREFERENCE-SPECIFICATION>
  <PREFERENCE-VARIABLE>
    <VARIABLE-NAME>Weather</VARIABLE-NAME>
    <DOMAIN-VALUE>Fair</DOMAIN-VALUE>
    <DOMAIN-VALUE>Rain</DOMAIN-VALUE>
  </PREFERENCE-VARIABLE>
  <PREFERENCE-VARIABLE>
    <VARIABLE-NAME>Time</VARIABLE-NAME>
    <DOMAIN-VALUE>Afternoon</DOMAIN-VALUE>
    <DOMAIN-VALUE>Morning</DOMAIN-VALUE>
  </PREFERENCE-VARIABLE>
  <PREFERENCE-VARIABLE>
    <VARIABLE-NAME>Activity</VARIABLE-NAME>
    <DOMAIN-VALUE>Cycling</DOMAIN-VALUE>
    <DOMAIN-VALUE>TableTennis</DOMAIN-VALUE>
  </PREFERENCE-VARIABLE>
  <PREFERENCE-VARIABLE>
    <VARIABLE-NAME>Friend</VARIABLE-NAME>
    <DOMAIN-VALUE>Emily</DOMAIN-VALUE>
    <DOMAIN-VALUE>Henry</DOMAIN-VALUE>
  </PREFERENCE-VARIABLE>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v0_p0</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Weather</PREFERENCE-VARIABLE>
    <PREFERENCE>Fair:Rain</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v1_p0</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Time</PREFERENCE-VARIABLE>
    <PREFERENCE>Afternoon:Morning</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v2_p0</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Activity</PREFERENCE-VARIABLE>
    <CONDITION>Time=Afternoon</CONDITION>
    <CONDITION>Weather=Fair</CONDITION>
    <PREFERENCE>Cycling:TableTennis</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v2_p1</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Activity</PREFERENCE-VARIABLE>
    <CONDITION>Time=Afternoon</CONDITION>
    <CONDITION>Weather=Rain</CONDITION>
    <PREFERENCE>TableTennis:Cycling</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v2_p2</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Activity</PREFERENCE-VARIABLE>
    <CONDITION>Time=Morning</CONDITION>
    <CONDITION>Weather=Fair</CONDITION>
    <PREFERENCE>TableTennis:Cycling</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v2_p3</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Activity</PREFERENCE-VARIABLE>
    <CONDITION>Time=Morning</CONDITION>
    <CONDITION>Weather=Rain</CONDITION>
    <PREFERENCE>TableTennis:Cycling</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v3_p0</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Friend</PREFERENCE-VARIABLE>
    <CONDITION>Activity=Cycling</CONDITION>
    <PREFERENCE>Emily:Henry</PREFERENCE>
  </PREFERENCE-STATEMENT>
  <PREFERENCE-STATEMENT>
    <STATEMENT-ID>v3_p1</STATEMENT-ID>
    <PREFERENCE-VARIABLE>Friend</PREFERENCE-VARIABLE>
    <CONDITION>Activity=TableTennis</CONDITION>
    <PREFERENCE>Henry:Emily</PREFERENCE>
  </PREFERENCE-STATEMENT>
</PREFERENCE-SPECIFICATION>";

    fn leaves(net: &CpNet, name: &str) -> Vec<Vec<i64>> {
        let id = net.find(name).unwrap();
        net.variable(id)
            .unwrap()
            .entries()
            .map(|e| e.leaf.to_raw())
            .collect()
    }

    /// The example net encodes to exactly the reference document.
    #[test]
    fn weather_example_encodes_exactly() {
        let net = weather_example().unwrap();
        assert_eq!(encode(&net), WEATHER_DOCUMENT);
    }

    /// decode(encode(G)) reproduces variables, domains, links and leaves.
    #[test]
    fn weather_example_round_trip() {
        let net = weather_example().unwrap();
        let decoded = decode(&encode(&net)).unwrap();
        assert!(decoded.is_clean(), "{:?}", decoded.issues);
        let back = &decoded.net;

        assert_eq!(back.len(), 4);
        for (_, original) in net.variables() {
            let id = back.find(original.name()).unwrap();
            let copy = back.variable(id).unwrap();
            assert_eq!(copy.domain(), original.domain());
            let parent_names = |net: &CpNet, v: &Variable| -> Vec<String> {
                v.parents()
                    .iter()
                    .map(|&p| net.name_of(p).unwrap().to_string())
                    .collect()
            };
            assert_eq!(parent_names(back, copy), parent_names(&net, original));
        }
        assert_eq!(
            leaves(back, "Activity"),
            vec![vec![0, 0, 1], vec![1, 0, 0], vec![1, 0, 0], vec![1, 0, 0]]
        );
        assert_eq!(leaves(back, "Friend"), vec![vec![0, 0, 1], vec![1, 0, 0]]);
        assert_eq!(net_fingerprint(back), net_fingerprint(&net));
        assert_eq!(encode(back), WEATHER_DOCUMENT);
    }

    /// A detached variable must join the net before members may depend on it,
    /// so every CONDITION in a document names a declared variable.
    #[test]
    fn detached_parent_joins_before_it_is_encoded() {
        let mut net = CpNet::new();
        let a = insert_variable(&mut net, "A", ["x", "y"]).unwrap();
        let draft = create_variable(&mut net, "Draft").unwrap();
        set_domain(&mut net, draft, ["p", "q"]).unwrap();
        assert_eq!(
            link(&mut net, draft, a, &LinkPolicy::acyclic()),
            Err(NetError::Link(LinkError::DetachedParent("Draft".into())))
        );
        let text = encode(&net);
        assert!(!text.contains("Draft"));
        assert!(decode(&text).unwrap().is_clean());

        add_variable(&mut net, draft).unwrap();
        link(&mut net, draft, a, &LinkPolicy::acyclic()).unwrap();
        set_preference(&mut net, a, &[1], Preference::strict([1, 0])).unwrap();
        let decoded = decode(&encode(&net)).unwrap();
        assert!(decoded.is_clean(), "{:?}", decoded.issues);
        assert_eq!(leaves(&decoded.net, "A"), vec![vec![0, 0, 1], vec![1, 0, 0]]);
        assert_eq!(net_fingerprint(&decoded.net), net_fingerprint(&net));
    }

    /// Whole editing session: build, reshape, prune, save.
    #[test]
    fn editing_lifecycle() {
        let mut net = weather_example().unwrap();
        let mut saved = SaveState::saved(&net);

        let weather = net.find("Weather").unwrap();
        let activity = net.find("Activity").unwrap();
        let friend = net.find("Friend").unwrap();

        // a third weather value adds a slice to Activity's Weather dimension
        assert_eq!(set_domain(&mut net, weather, ["Fair", "Rain", "Snow"]), Ok(true));
        let activity_var = net.variable(activity).unwrap();
        assert_eq!(activity_var.cpt().dims(), &[2, 3]);
        assert_eq!(activity_var.preference(&[0, 2]), activity_var.preference(&[0, 0]));
        assert!(!saved.is_saved(&net));

        // Friend -> Weather would close Weather -> Activity -> Friend -> Weather
        assert_eq!(
            link(&mut net, friend, weather, &LinkPolicy::acyclic()),
            Err(NetError::Link(LinkError::CyclesNotAllowed))
        );
        assert!(!has_cycle(&net));

        // Weather only matters in the afternoon, so it is not degenerate
        assert_eq!(
            verdict_with_config(&net, activity, 1),
            Degeneracy::NotDegenerate
        );

        destroy(&mut net, weather).unwrap();
        let activity_var = net.variable(activity).unwrap();
        assert_eq!(activity_var.cpt().dims(), &[2]);
        assert_eq!(
            activity_var.preference(&[0]),
            Some(&Preference::strict([0, 1]))
        );
        assert_eq!(net.len(), 3);

        let text = encode(&net);
        let decoded = decode(&text).unwrap();
        assert!(decoded.is_clean());
        saved.mark_saved(&decoded.net);
        assert!(saved.is_saved(&net));
    }

    #[test]
    fn snapshot_and_document_agree() {
        let net = weather_example().unwrap();
        let restored = NetSnapshot::from_cbor(&NetSnapshot::capture(&net).to_cbor().unwrap())
            .unwrap()
            .restore()
            .unwrap();
        assert_eq!(encode(&restored), encode(&net));
    }

    #[test]
    fn fresh_net_round_trips() {
        let net = fresh().unwrap();
        let decoded = decode(&encode(&net)).unwrap();
        assert!(decoded.is_clean());
        assert_eq!(net_fingerprint(&decoded.net), net_fingerprint(&net));
    }
}
