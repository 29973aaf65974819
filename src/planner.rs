//! End-to-end planning pipeline: prepare the contact graph once, route every
//! sensing event through it, report routes and freshness metrics.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use hifitime::{Duration, Epoch, Unit};
use itertools::Itertools;
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    access::{AccessConstraint, IslConstraints},
    constellation::{Constellation, GroundLocation, ScheduledManeuver},
    errors::{ConfigError, Error},
    graph::{ContactGraph, ContactSeries, TimeVaryingGraph},
    grid::TimeGrid,
    intervals::{excise_short_intervals, true_intervals, ContactInterval},
    metrics::{integrate, DeliveryEvent, Metrics},
    node::{GroundId, NodeId, PlaneId, SatId},
    providers::{GroundEphemeris, ManeuverScheduler, OrbitPropagator},
    router::earliest_arrival_cancellable,
    state::{AccessSeries, RelativeSeries, StateSeries},
};

/// Planner configuration. Defaults mirror a typical small imaging
/// constellation study: 3 day horizon at 15 s resolution, 1250 km ISL range,
/// 25° station elevation and 20° sensor nadir bounds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Epoch of the planning run: grid origin and metrics window start.
    pub start: Epoch,

    /// Altitude delta handed to the maneuver scheduler (km).
    pub alt_change_km: f64,

    /// Ground-station access predicate.
    pub gs_constraint: AccessConstraint,

    /// Target-sensing access predicate.
    pub sense_constraint: AccessConstraint,

    /// Propagation span; with [Self::t_step] it fixes the grid.
    pub t2propagate: Duration,

    /// Grid resolution.
    pub t_step: Duration,

    /// Inter-satellite link feasibility bounds.
    pub isl_constraints: IslConstraints,

    /// Minimum ISL contact length able to carry a full transfer.
    pub isl_time_threshold: Duration,

    /// Minimum ground contact length able to carry a full transfer.
    pub downlink_time_threshold: Duration,

    /// AND the lighting mask onto target access.
    pub lighting_restraint: bool,

    /// Simulation horizon: router sentinel bound and metrics window length.
    pub sim_time: Duration,

    /// Apply the maneuver schedule during propagation.
    pub recon: bool,

    /// Allow satellite-to-satellite relaying.
    pub isl: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: Epoch::from_gregorian_utc_at_midnight(2020, 1, 1),
            alt_change_km: 100.0,
            gs_constraint: AccessConstraint::Elevation(25.0_f64.to_radians()),
            sense_constraint: AccessConstraint::Nadir(20.0_f64.to_radians()),
            t2propagate: 3 * Unit::Day,
            t_step: 15 * Unit::Second,
            isl_constraints: IslConstraints {
                max_range_km: 1250.0,
                max_slew_rate_rad_s: 3.0_f64.to_radians(),
                doppler_bounds: None,
            },
            isl_time_threshold: 2.5 * Unit::Minute,
            downlink_time_threshold: 30 * Unit::Second,
            lighting_restraint: false,
            sim_time: 3 * Unit::Day,
            recon: true,
            isl: true,
        }
    }
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.t_step <= Duration::ZERO {
            return Err(ConfigError::NonPositiveTimeStep);
        }
        if self.sim_time <= Duration::ZERO {
            return Err(ConfigError::NonPositiveHorizon);
        }
        self.isl_constraints.validate()
    }
}

/// Target access record of one sensing satellite: every pass it gets over
/// the target within the horizon. An empty interval list is the normal "no
/// access" signal, not an error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PassRecord {
    pub sat: SatId,
    pub intervals: Vec<ContactInterval>,
}

impl PassRecord {
    /// Length of every pass, in interval order.
    pub fn lengths(&self) -> Vec<Duration> {
        self.intervals.iter().map(|i| i.duration()).collect()
    }

    /// Total time this satellite spent over the target.
    pub fn total(&self) -> Duration {
        self.intervals
            .iter()
            .fold(Duration::ZERO, |acc, i| acc + i.duration())
    }
}

/// Downlink selection of one sensing event. `delivered` is false when no
/// route reached a station within the horizon; `arrival` then carries the
/// sentinel bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DownlinkRecord {
    pub sat: SatId,
    pub pass_index: usize,

    /// End of the sensing pass: the instant imagery becomes available.
    pub pass_end: Epoch,

    /// Selected ground station (earliest arrival, ties by identity).
    pub station: GroundId,

    /// Arrival instant at the selected station.
    pub arrival: Epoch,

    pub delivered: bool,
}

/// Node path of one delivered sensing event: sensing satellite first, chosen
/// ground station last.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteRecord {
    pub sat: SatId,
    pub pass_index: usize,
    pub nodes: Vec<NodeId>,
}

/// Wall-clock cost of the run.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timings {
    pub scheduling: Duration,
    pub routing: Duration,
    pub total: Duration,
}

/// Everything one planning run produced.
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// One record per sensing event, in (satellite, pass) order.
    pub downlinks: Vec<DownlinkRecord>,

    /// Node paths of the delivered events.
    pub paths: Vec<RouteRecord>,

    /// Target access of every sensing satellite.
    pub pass_times: Vec<PassRecord>,

    /// Maneuverers selected per plane by the external scheduler.
    pub schedule: BTreeMap<PlaneId, Vec<ScheduledManeuver>>,

    /// The assembled contact graph, kept for diagnostics and plotting.
    pub contacts: ContactGraph,

    pub metrics: Metrics,

    pub timings: Timings,
}

impl PlanResult {
    /// Mapping view of [Self::downlinks]: satellite, pass index, then the
    /// selected station and arrival.
    pub fn downlinks_map(&self) -> BTreeMap<SatId, BTreeMap<usize, (GroundId, Epoch)>> {
        let mut map = BTreeMap::<SatId, BTreeMap<usize, (GroundId, Epoch)>>::new();
        for record in &self.downlinks {
            map.entry(record.sat)
                .or_default()
                .insert(record.pass_index, (record.station, record.arrival));
        }
        map
    }

    /// Mapping view of [Self::paths].
    pub fn paths_map(&self) -> BTreeMap<SatId, BTreeMap<usize, &[NodeId]>> {
        let mut map = BTreeMap::<SatId, BTreeMap<usize, &[NodeId]>>::new();
        for record in &self.paths {
            map.entry(record.sat)
                .or_default()
                .insert(record.pass_index, record.nodes.as_slice());
        }
        map
    }

    /// Mapping view of [Self::pass_times]: per satellite, its target access
    /// intervals and their lengths.
    pub fn pass_times_map(&self) -> BTreeMap<SatId, (&[ContactInterval], Vec<Duration>)> {
        self.pass_times
            .iter()
            .map(|record| (record.sat, (record.intervals.as_slice(), record.lengths())))
            .collect()
    }
}

/// Prepared pipeline state: propagation, geometry, access and graph assembly,
/// shared by every routing pass over the same inputs.
#[derive(Debug, Clone)]
pub struct Prepared {
    grid: Arc<TimeGrid>,
    schedule: BTreeMap<PlaneId, Vec<ScheduledManeuver>>,
    contacts: ContactGraph,
    pass_times: Vec<PassRecord>,
    scheduling_time: Duration,
    preparation_time: Duration,
}

impl Prepared {
    pub fn grid(&self) -> &Arc<TimeGrid> {
        &self.grid
    }

    pub fn contacts(&self) -> &ContactGraph {
        &self.contacts
    }

    pub fn pass_times(&self) -> &[PassRecord] {
        &self.pass_times
    }

    pub fn schedule(&self) -> &BTreeMap<PlaneId, Vec<ScheduledManeuver>> {
        &self.schedule
    }
}

/// Data-delivery planner for one constellation, ground segment and target.
#[derive(Debug, Clone)]
pub struct Planner {
    constellation: Constellation,
    ground_stations: Vec<GroundLocation>,
    target: GroundLocation,
    config: Config,
}

impl Planner {
    /// Builds a planner, validating the configuration and inputs up front.
    pub fn new(
        constellation: Constellation,
        ground_stations: Vec<GroundLocation>,
        target: GroundLocation,
        config: Config,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        if constellation.is_empty() {
            return Err(ConfigError::EmptyConstellation);
        }
        if ground_stations.is_empty() {
            return Err(ConfigError::EmptyGroundStations);
        }

        Ok(Self {
            constellation,
            ground_stations,
            target,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Phase one: schedule, propagate, evaluate access and assemble the
    /// contact graph. The result is shared by every subsequent [Self::route].
    pub fn prepare<P: OrbitPropagator, S: ManeuverScheduler, G: GroundEphemeris>(
        &self,
        propagator: &P,
        scheduler: &S,
        ephemeris: &G,
    ) -> Result<Prepared, Error> {
        let sched_start = Instant::now();

        debug!("step 1 of 5: generating maneuver schedule");
        let schedule = scheduler.select_maneuverers(
            &self.constellation,
            &self.target,
            self.config.alt_change_km,
        );
        let scheduling_time = elapsed(sched_start);

        let prep_start = Instant::now();

        debug!("step 2 of 5: propagating satellites");
        let grid = Arc::new(TimeGrid::new(
            self.config.start,
            self.config.t2propagate,
            self.config.t_step,
        )?);

        let mut maneuvers = BTreeMap::new();
        for scheduled in schedule.values().flatten() {
            maneuvers.insert(scheduled.sat, scheduled.plan);
        }

        let mut states = BTreeMap::<SatId, StateSeries>::new();
        for sat in self.constellation.satellites_iter() {
            let maneuver = if self.config.recon {
                maneuvers.get(&sat)
            } else {
                None
            };
            states.insert(sat, propagator.sample(sat, maneuver, &grid)?);
        }

        let mut contacts = ContactGraph::new();

        if self.config.isl {
            debug!("step 3 of 5: inter-satellite feasibility");
            for (a, b) in states.keys().copied().tuple_combinations() {
                let rel = RelativeSeries::between(&states[&a], &states[&b]);
                let mut mask = self.config.isl_constraints.feasibility_mask(&rel);
                excise_short_intervals(&mut mask, &grid, self.config.isl_time_threshold);
                contacts.insert_symmetric(
                    a.into(),
                    b.into(),
                    ContactSeries::new(mask, grid.clone()),
                );
            }
        } else {
            debug!("step 3 of 5: inter-satellite links disabled, skipped");
        }

        debug!("step 4 of 5: ground access");
        for station in &self.ground_stations {
            let ground = ephemeris.sample(station, &grid);
            for (sat, state) in &states {
                let access = AccessSeries::between(state, &ground);
                let mut mask = self.config.gs_constraint.access_mask(&access);
                excise_short_intervals(&mut mask, &grid, self.config.downlink_time_threshold);
                contacts.insert_symmetric(
                    (*sat).into(),
                    station.id.into(),
                    ContactSeries::new(mask, grid.clone()),
                );
            }
        }

        // target passes of the sensing satellites feed the router as
        // sensing events, they never enter the graph
        let target_series = ephemeris.sample(&self.target, &grid);

        let sensing_sats: Vec<SatId> = schedule
            .values()
            .flatten()
            .map(|m| m.sat)
            .sorted()
            .dedup()
            .collect();

        let mut pass_times = Vec::with_capacity(sensing_sats.len());
        for sat in sensing_sats {
            let Some(state) = states.get(&sat) else {
                warn!("{} scheduled but absent from the constellation", sat);
                continue;
            };

            let access = AccessSeries::between(state, &target_series);
            let mask = if self.config.lighting_restraint {
                self.config.sense_constraint.access_mask_lit(&access)
            } else {
                self.config.sense_constraint.access_mask(&access)
            };

            let intervals = true_intervals(&mask, &grid);
            if intervals.is_empty() {
                debug!("{}: no access to the target within the horizon", sat);
            }

            pass_times.push(PassRecord { sat, intervals });
        }

        Ok(Prepared {
            grid,
            schedule,
            contacts,
            pass_times,
            scheduling_time,
            preparation_time: elapsed(prep_start),
        })
    }

    /// Phase two: route every sensing event and derive the metrics.
    pub fn route(&self, prepared: &Prepared) -> PlanResult {
        self.route_cancellable(prepared, &AtomicBool::new(false))
    }

    /// Same as [Self::route], stopping once `cancel` is raised: between
    /// sensing events, and between iterations of the relaxation loop inside
    /// an event. Events routed before cancellation stay valid in the result;
    /// an event interrupted mid-relaxation is discarded.
    pub fn route_cancellable(&self, prepared: &Prepared, cancel: &AtomicBool) -> PlanResult {
        let route_start = Instant::now();
        debug!("step 5 of 5: routing sensing events");

        let sim_start = prepared.grid.start();
        let horizon = sim_start + self.config.sim_time;

        let station_nodes: Vec<NodeId> = self
            .ground_stations
            .iter()
            .map(|g| NodeId::Ground(g.id))
            .collect();

        let mut downlinks = Vec::new();
        let mut paths = Vec::new();

        'events: for record in &prepared.pass_times {
            let source = NodeId::Satellite(record.sat);

            // without relaying only the sensing satellite and the stations
            // remain visible; the prepared contact data is shared either way
            let view = if self.config.isl {
                TimeVaryingGraph::new(&prepared.contacts)
            } else {
                let mut allowed: BTreeSet<NodeId> = station_nodes.iter().copied().collect();
                allowed.insert(source);
                TimeVaryingGraph::restricted(&prepared.contacts, allowed)
            };

            for (pass_index, interval) in record.intervals.iter().enumerate() {
                if cancel.load(Ordering::Relaxed) {
                    debug!("routing cancelled, keeping completed events");
                    break 'events;
                }

                // imagery is available at end of pass
                let start_time = interval.end;
                let Some(table) = earliest_arrival_cancellable(
                    &view,
                    source,
                    start_time,
                    sim_start,
                    self.config.sim_time,
                    cancel,
                ) else {
                    debug!("routing cancelled mid event, keeping completed events");
                    break 'events;
                };

                let Some((sink, arrival)) = table.best_sink(&station_nodes) else {
                    continue;
                };
                let Some(station) = sink.as_ground() else {
                    continue;
                };

                let delivered = arrival < horizon;
                if delivered {
                    debug!(
                        "{} pass {}: downlink at {} via {}",
                        record.sat, pass_index, arrival, station
                    );
                    if let Some(nodes) = table.path_to(sink) {
                        paths.push(RouteRecord {
                            sat: record.sat,
                            pass_index,
                            nodes,
                        });
                    }
                } else {
                    debug!(
                        "{} pass {}: no downlink within the horizon",
                        record.sat, pass_index
                    );
                }

                downlinks.push(DownlinkRecord {
                    sat: record.sat,
                    pass_index,
                    pass_end: start_time,
                    station,
                    arrival,
                    delivered,
                });
            }
        }

        // only delivered events enter the integral, a sentinel arrival is
        // "no downlink" as far as freshness is concerned
        let mut deliveries: Vec<DeliveryEvent> = downlinks
            .iter()
            .filter(|d| d.delivered)
            .map(|d| DeliveryEvent {
                pass_end: d.pass_end,
                downlink: d.arrival,
            })
            .collect();
        deliveries.sort_by_key(|e| (e.downlink, e.pass_end));

        let pass_time_sum = prepared
            .pass_times
            .iter()
            .fold(Duration::ZERO, |acc, r| acc + r.total());

        let metrics = integrate(&deliveries, sim_start, self.config.sim_time, pass_time_sum);

        let routing = prepared.preparation_time + elapsed(route_start);
        let timings = Timings {
            scheduling: prepared.scheduling_time,
            routing,
            total: prepared.scheduling_time + routing,
        };

        PlanResult {
            downlinks,
            paths,
            pass_times: prepared.pass_times.clone(),
            schedule: prepared.schedule.clone(),
            contacts: prepared.contacts.clone(),
            metrics,
            timings,
        }
    }

    /// Runs both phases back to back.
    pub fn plan<P: OrbitPropagator, S: ManeuverScheduler, G: GroundEphemeris>(
        &self,
        propagator: &P,
        scheduler: &S,
        ephemeris: &G,
    ) -> Result<PlanResult, Error> {
        let prepared = self.prepare(propagator, scheduler, ephemeris)?;
        Ok(self.route(&prepared))
    }
}

fn elapsed(start: Instant) -> Duration {
    Duration::from_seconds(start.elapsed().as_secs_f64())
}
