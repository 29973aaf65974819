//! Freshness metrics integrated over the downlink sequence.
use hifitime::{Duration, Epoch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One delivered sensing event: the pass end (imagery available) and the
/// downlink instant that delivered it.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveryEvent {
    /// End of the sensing pass.
    pub pass_end: Epoch,

    /// Instant the data reached a ground station.
    pub downlink: Epoch,
}

/// Metric bundle of one planning run.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metrics {
    /// Age of Information: time average of the staleness of the freshest
    /// delivered observation.
    pub aoi: Duration,

    /// System response time: simulation start to first downlink.
    pub srt: Duration,

    /// Total time any sensing satellite spent over the target.
    pub pass_time_sum: Duration,
}

/// Integrates Age of Information over the window `[sim_start, sim_start + span]`.
///
/// `deliveries` must be sorted by downlink instant. The age signal grows
/// linearly from each pass end and resets at the corresponding downlink;
/// because downlinks can arrive out of order relative to sensing, the
/// integral is assembled from per-downlink trapezoidal areas between
/// successive downlinks and their preceding passes.
///
/// With no delivery at all both the AoI and the response time degenerate to
/// the full window length.
pub fn integrate(
    deliveries: &[DeliveryEvent],
    sim_start: Epoch,
    span: Duration,
    pass_time_sum: Duration,
) -> Metrics {
    debug_assert!(
        deliveries.windows(2).all(|w| w[0].downlink <= w[1].downlink),
        "deliveries must be sorted by downlink instant"
    );

    if deliveries.is_empty() {
        return Metrics {
            aoi: span,
            srt: span,
            pass_time_sum,
        };
    }

    let sim_end = sim_start + span;
    let mut area_s2 = 0.0;

    // age has been growing since the start of the window
    let first = (deliveries[0].downlink - sim_start).to_seconds();
    area_s2 += 0.5 * first * first;

    for pair in deliveries.windows(2) {
        let pass_end = pair[0].pass_end;
        let grown = (pair[1].downlink - pass_end).to_seconds();
        let reset = (pair[0].downlink - pass_end).to_seconds();
        area_s2 += 0.5 * (grown * grown - reset * reset);
    }

    // tail: the last delivery ages until the end of the window
    let last = deliveries[deliveries.len() - 1];
    let grown = (sim_end - last.pass_end).to_seconds();
    let reset = (last.downlink - last.pass_end).to_seconds();
    area_s2 += 0.5 * (grown * grown - reset * reset);

    Metrics {
        aoi: Duration::from_seconds(area_s2 / span.to_seconds()),
        srt: deliveries[0].downlink - sim_start,
        pass_time_sum,
    }
}
