//! The shell-recursive integrator: critical radii, shell membership,
//! interaction evaluation, drifts, and the driver-facing surface.

use log::warn;

use orrery_math::{sqrt3, Vec3, TWO_PI};
use orrery_model::{CollisionMode, GravityMode, Simulation, TestParticleKind};

use crate::encounter::predict_rmin2;
use crate::scheme::{Op, Scheme};
use crate::switching::Switching;

/// Hierarchical multi-shell symplectic integrator.
///
/// Configuration fields are public and may be changed between macro steps.
/// The shell buffers are owned by the integrator, indexed by body index, and
/// resized automatically when the body count grows. A driver calls
/// [`part1`](Self::part1) and [`part2`](Self::part2) once per macro step, in
/// that order, and [`synchronize`](Self::synchronize) before inspecting
/// positions and velocities (a no-op in safe mode or when already
/// synchronized).
#[derive(Debug, Clone)]
pub struct ShellIntegrator {
    /// Scheme used at shell 0.
    pub scheme_outer: Scheme,
    /// Scheme used at shells >= 1.
    pub scheme_inner: Scheme,
    /// Inner subdivision: each drift sub-step at depth s spawns n composed
    /// steps at depth s+1.
    pub n: usize,
    /// Route all bodies into shell 1 so the inner schedule handles the
    /// dominant central-body motion. Requires the central body at index 0.
    pub whsplitting: bool,
    /// Synchronize after every macro step.
    pub safe_mode: bool,
    /// Ratio of a shell's step to the local dynamical time at its critical
    /// radius; smaller values give tighter shells.
    pub dt_frac: f64,
    /// Hard bound on the number of shells. Encounters that would need more
    /// depth are absorbed by the innermost shell at its own resolution.
    pub max_shells: usize,
    /// Switching function partitioning pair forces between shells.
    pub switching: Switching,
    /// One-shot trigger: rebuild the critical radii on the next `part1`.
    pub recalculate_dcrit: bool,

    dcrit: Vec<Vec<f64>>,
    map: Vec<Vec<usize>>,
    shell_n: Vec<usize>,
    shell_n_active: Vec<usize>,
    inshell: Vec<bool>,
    jerk: Vec<Vec3>,
    allocated_n: usize,
    max_shell_used: usize,
    is_synchronized: bool,
}

impl Default for ShellIntegrator {
    fn default() -> Self {
        Self {
            scheme_outer: Scheme::Leapfrog,
            scheme_inner: Scheme::Leapfrog,
            n: 10,
            whsplitting: true,
            safe_mode: true,
            dt_frac: 0.1,
            max_shells: 10,
            switching: Switching::default(),
            recalculate_dcrit: false,
            dcrit: Vec::new(),
            map: Vec::new(),
            shell_n: Vec::new(),
            shell_n_active: Vec::new(),
            inshell: Vec::new(),
            jerk: Vec::new(),
            allocated_n: 0,
            max_shell_used: 1,
            is_synchronized: true,
        }
    }
}

/// Shell-band weight of a pair interaction and its distance derivative.
///
/// Each shell handles the band of distances between its own critical sum and
/// the one of the shell above: the inner switching term fades the pair in as
/// it approaches, the outer term fades it out again once the shell below has
/// taken over. Summed over all shells a pair appears in, the weights
/// telescope to exactly 1.
fn lsum_band(
    d: f64,
    dc_outer: Option<f64>,
    dc_curr: f64,
    dc_inner: Option<f64>,
    sw: &Switching,
) -> (f64, f64) {
    let mut lsum = 0.0;
    let mut dlsum = 0.0;
    if let Some(dc_o) = dc_outer {
        lsum -= (sw.l)(d, dc_curr, dc_o);
        dlsum -= (sw.dl_dd)(d, dc_curr, dc_o);
    }
    match dc_inner {
        Some(dc_i) => {
            lsum += (sw.l)(d, dc_i, dc_curr);
            dlsum += (sw.dl_dd)(d, dc_i, dc_curr);
        }
        // Innermost shell: nothing below to hand over to.
        None => lsum += 1.0,
    }
    (lsum, dlsum)
}

impl ShellIntegrator {
    /// Deepest shell count ever used since the last reset (>= 1).
    pub fn max_shell_used(&self) -> usize {
        self.max_shell_used
    }

    /// Whether positions and velocities are currently consistent.
    pub fn is_synchronized(&self) -> bool {
        self.is_synchronized
    }

    /// Body indices currently assigned to `shell`, active ones first.
    /// Transient: rebuilt at every drift of the shell above.
    pub fn shell_bodies(&self, shell: usize) -> &[usize] {
        &self.map[shell][..self.shell_n[shell]]
    }

    /// Per-body critical radii at `shell`.
    pub fn dcrit(&self, shell: usize) -> &[f64] {
        &self.dcrit[shell]
    }

    /// Pre-step bookkeeping: configuration validation, buffer lifecycle,
    /// critical-radius recomputation. Must run before [`part2`](Self::part2).
    pub fn part1(&mut self, sim: &mut Simulation) {
        if sim.n_var > 0 {
            warn!("variational equations are not supported and will not be propagated");
        }
        if self.n == 0 {
            warn!("inner subdivision must be positive; using 1");
            self.n = 1;
        }
        if self.whsplitting && self.max_shells < 2 {
            warn!("WH splitting needs at least two shells; disabling it");
            self.whsplitting = false;
        }

        let n = sim.bodies.len();
        if self.allocated_n < n || self.dcrit.len() != self.max_shells {
            self.dcrit = vec![vec![0.0; n]; self.max_shells];
            self.map = vec![vec![0; n]; self.max_shells];
            self.inshell = vec![false; n];
            self.jerk = vec![Vec3::zeros(); n];
            self.shell_n = vec![0; self.max_shells];
            self.shell_n_active = vec![0; self.max_shells];
            self.allocated_n = n;
            self.recalculate_dcrit = true;
        }

        if self.recalculate_dcrit {
            self.recalculate_dcrit = false;
            if !self.is_synchronized {
                warn!("recalculating critical radii while unsynchronized; synchronizing first");
                self.synchronize(sim);
            }
            let mut dt_shell = sim.dt;
            for s in 0..self.max_shells {
                // Distance at which dt_shell / dt_frac equals the dynamical
                // timescale. The body radius does not enter.
                let t_dyn = dt_shell / (self.dt_frac * TWO_PI);
                for (i, body) in sim.bodies.iter().enumerate() {
                    self.dcrit[s][i] = sqrt3(t_dyn * t_dyn * sim.g * body.m);
                }
                let longest_drift_in_shell = 0.5;
                dt_shell *= longest_drift_in_shell;
                dt_shell /= self.n as f64;
                self.shell_n[s] = 0;
                self.shell_n_active[s] = 0;
            }
            // The outermost map is the identity permutation.
            for i in 0..n {
                self.map[0][i] = i;
            }
        }

        if !matches!(sim.collision, CollisionMode::None | CollisionMode::Direct) {
            warn!("only a direct collision search works with the shell integrator");
        }
        if !matches!(sim.gravity, GravityMode::None | GravityMode::Basic) {
            warn!("the shell integrator evaluates gravity itself; the configured routine is ignored");
        }
        sim.gravity = GravityMode::None;
    }

    /// One macro step: preprocessor if synchronized, outer kernel, then
    /// postprocessor in safe mode. Advances `sim.t`.
    pub fn part2(&mut self, sim: &mut Simulation) {
        let n = sim.bodies.len();
        self.shell_n[0] = n;
        self.shell_n_active[0] = sim.n_active_resolved();

        let dt = sim.dt;
        let outer = self.scheme_outer;
        if self.is_synchronized {
            self.preprocess(sim, dt, 0, outer);
        }
        self.run_kernel(sim, dt, 0, outer);

        self.is_synchronized = false;
        if self.safe_mode {
            self.synchronize(sim);
        }

        sim.t += dt;
        sim.dt_last_done = dt;
    }

    /// Bring positions and velocities to a consistent state by running the
    /// outer postprocessor. Idempotent.
    pub fn synchronize(&mut self, sim: &mut Simulation) {
        if !self.is_synchronized {
            // Restated here because archive restores may have reset it.
            sim.gravity = GravityMode::None;
            let dt = sim.dt;
            let outer = self.scheme_outer;
            self.postprocess(sim, dt, 0, outer);
            self.is_synchronized = true;
        }
    }

    /// Release all owned buffers and restore the default configuration.
    pub fn reset(&mut self) {
        *self = ShellIntegrator::default();
    }

    fn run_kernel(&mut self, sim: &mut Simulation, dt: f64, shell: usize, scheme: Scheme) {
        for op in scheme.kernel() {
            self.apply(sim, *op, dt, shell);
        }
    }

    fn preprocess(&mut self, sim: &mut Simulation, dt: f64, shell: usize, scheme: Scheme) {
        for op in scheme.processor() {
            self.apply(sim, *op, dt, shell);
        }
    }

    fn postprocess(&mut self, sim: &mut Simulation, dt: f64, shell: usize, scheme: Scheme) {
        for op in scheme.processor().iter().rev() {
            self.apply(sim, *op, -dt, shell);
        }
    }

    fn apply(&mut self, sim: &mut Simulation, op: Op, dt: f64, shell: usize) {
        match op {
            Op::Drift(c) => self.drift_step(sim, c * dt, shell),
            Op::Kick { y, v } => self.interaction_step(sim, y * dt, v * dt * dt * dt, shell),
        }
    }

    /// Rebuild `map[shell + 1]` for a drift of length `dt` at `shell`, and
    /// flag which bodies stay at this layer.
    fn encounter_predict(&mut self, sim: &Simulation, dt: f64, shell: usize) {
        let n = self.shell_n[shell];
        let n_active = self.shell_n_active[shell];

        if shell == 0 && self.whsplitting {
            // Shell 0 is only a router: all motion, including the dominant
            // central-body Keplerian drift, happens from shell 1 down.
            for i in 0..n {
                let mi = self.map[0][i];
                self.inshell[mi] = false;
                self.map[1][i] = mi;
            }
            self.shell_n[1] = n;
            self.shell_n_active[1] = n_active;
            return;
        }

        for i in 0..n {
            let mi = self.map[shell][i];
            self.inshell[mi] = true;
        }

        if shell + 1 >= self.max_shells {
            return;
        }

        self.shell_n[shell + 1] = 0;
        self.shell_n_active[shell + 1] = 0;

        // Active bodies are scanned first so the active-first partition of
        // the sub-shell map holds by construction. The capture threshold is
        // this shell's own critical sum: a pair must already be a member of
        // the sub-shell while it traverses this shell's switching band,
        // otherwise the band's share of the force would have no shell to
        // land in and the partition would no longer telescope to one.
        for i in 0..n_active {
            let mi = self.map[shell][i];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mj = self.map[shell][j];
                let (_, rmin2) = predict_rmin2(&sim.bodies[mi], &sim.bodies[mj], dt);
                let dcritsum = self.dcrit[shell][mi] + self.dcrit[shell][mj];
                if rmin2 < dcritsum * dcritsum {
                    self.inshell[mi] = false;
                    let k = self.shell_n[shell + 1];
                    self.map[shell + 1][k] = mi;
                    self.shell_n[shell + 1] = k + 1;
                    break;
                }
            }
        }
        self.shell_n_active[shell + 1] = self.shell_n[shell + 1];

        // Passive bodies only ever encounter active ones.
        for i in n_active..n {
            let mi = self.map[shell][i];
            for j in 0..n_active {
                let mj = self.map[shell][j];
                let (_, rmin2) = predict_rmin2(&sim.bodies[mi], &sim.bodies[mj], dt);
                let dcritsum = self.dcrit[shell][mi] + self.dcrit[shell][mj];
                if rmin2 < dcritsum * dcritsum {
                    self.inshell[mi] = false;
                    let k = self.shell_n[shell + 1];
                    self.map[shell + 1][k] = mi;
                    self.shell_n[shell + 1] = k + 1;
                    break;
                }
            }
        }
    }

    /// Advance positions of in-shell bodies and recurse into the sub-shell
    /// for anybody promoted out of this layer. Kicks never recurse; all
    /// multi-rate behavior lives here.
    fn drift_step(&mut self, sim: &mut Simulation, a: f64, shell: usize) {
        self.encounter_predict(sim, a, shell);

        let n = self.shell_n[shell];
        for i in 0..n {
            let mi = self.map[shell][i];
            if self.inshell[mi] {
                let vel = sim.bodies[mi].vel;
                sim.bodies[mi].pos += vel * a;
            }
        }

        if shell + 1 < self.max_shells && self.shell_n[shell + 1] > 0 {
            self.max_shell_used = self.max_shell_used.max(shell + 2);
            let a_inner = a / self.n as f64;
            let inner = self.scheme_inner;
            self.preprocess(sim, a_inner, shell + 1, inner);
            for _ in 0..self.n {
                self.run_kernel(sim, a_inner, shell + 1, inner);
            }
            self.postprocess(sim, a_inner, shell + 1, inner);
        }
    }

    fn pair_bands(
        &self,
        shell: usize,
        mi: usize,
        mj: usize,
        skip_outer: bool,
    ) -> (Option<f64>, f64, Option<f64>) {
        let dc_curr = self.dcrit[shell][mi] + self.dcrit[shell][mj];
        let dc_outer = if shell > 0 && !skip_outer {
            Some(self.dcrit[shell - 1][mi] + self.dcrit[shell - 1][mj])
        } else {
            None
        };
        let dc_inner = if shell + 1 < self.max_shells {
            Some(self.dcrit[shell + 1][mi] + self.dcrit[shell + 1][mj])
        } else {
            None
        };
        (dc_outer, dc_curr, dc_inner)
    }

    /// Evaluate shell-weighted accelerations (and, for force-gradient
    /// kicks, jerks) and update velocities: `v += y·a + v_coeff·j`.
    ///
    /// `y` and `v_coeff` arrive premultiplied by dt and dt³. Polls the
    /// simulation interrupt flag between outer loop iterations and returns
    /// early when set, leaving velocities at the last completed sub-step.
    fn interaction_step(&mut self, sim: &mut Simulation, y: f64, v_coeff: f64, shell: usize) {
        let n = self.shell_n[shell];
        let n_active = self.shell_n_active[shell];
        let g = sim.g;
        let symmetric_testparticles = sim.testparticle_kind == TestParticleKind::Interacting;
        let sw = self.switching;

        for i in 0..n {
            let mi = self.map[shell][i];
            sim.bodies[mi].acc = Vec3::zeros();
        }

        // With WH splitting the central body's interactions are handled
        // from shell 1 down; shell 0 couples the planets among themselves.
        let starti = if self.whsplitting && shell == 0 { 1 } else { 0 };

        for i in starti..n_active {
            if sim.interrupt_requested() {
                return;
            }
            let mi = self.map[shell][i];
            for j in (i + 1)..n_active {
                let mj = self.map[shell][j];
                let dr = sim.bodies[mi].pos - sim.bodies[mj].pos;
                let d = dr.norm();
                // The star-planet pairs routed into shell 1 by WH splitting
                // are handled entirely at that layer.
                let skip_outer = self.whsplitting && shell == 1 && i == 0;
                let (dc_o, dc_c, dc_i) = self.pair_bands(shell, mi, mj, skip_outer);
                let (lsum, _) = lsum_band(d, dc_o, dc_c, dc_i, &sw);
                let prefact = g * lsum / (d * d * d);
                let m_i = sim.bodies[mi].m;
                let m_j = sim.bodies[mj].m;
                sim.bodies[mi].acc += dr * (-prefact * m_j);
                sim.bodies[mj].acc += dr * (prefact * m_i);
            }
        }
        for i in n_active..n {
            if sim.interrupt_requested() {
                return;
            }
            let mi = self.map[shell][i];
            for j in starti..n_active {
                let mj = self.map[shell][j];
                let dr = sim.bodies[mi].pos - sim.bodies[mj].pos;
                let d = dr.norm();
                let skip_outer = self.whsplitting && shell == 1 && j == 0;
                let (dc_o, dc_c, dc_i) = self.pair_bands(shell, mi, mj, skip_outer);
                let (lsum, _) = lsum_band(d, dc_o, dc_c, dc_i, &sw);
                let prefact = g * lsum / (d * d * d);
                let m_j = sim.bodies[mj].m;
                sim.bodies[mi].acc += dr * (-prefact * m_j);
                if symmetric_testparticles {
                    let m_i = sim.bodies[mi].m;
                    sim.bodies[mj].acc += dr * (prefact * m_i);
                }
            }
        }

        if v_coeff != 0.0 {
            for slot in self.jerk.iter_mut().take(n) {
                *slot = Vec3::zeros();
            }
            for i in starti..n_active {
                if sim.interrupt_requested() {
                    return;
                }
                let mi = self.map[shell][i];
                for j in (i + 1)..n_active {
                    let mj = self.map[shell][j];
                    let dr = sim.bodies[mj].pos - sim.bodies[mi].pos;
                    let da = sim.bodies[mj].acc - sim.bodies[mi].acc;
                    let d = dr.norm();
                    let skip_outer = self.whsplitting && shell == 1 && i == 0;
                    let (dc_o, dc_c, dc_i) = self.pair_bands(shell, mi, mj, skip_outer);
                    let (lsum, dlsum) = lsum_band(d, dc_o, dc_c, dc_i, &sw);
                    let alpha = da.dot(&dr);
                    let prefact2 = 2.0 * g / (d * d * d);
                    let m_i = sim.bodies[mi].m;
                    let m_j = sim.bodies[mj].m;
                    self.jerk[j] -= da * (lsum * prefact2 * m_i);
                    self.jerk[i] += da * (lsum * prefact2 * m_j);
                    let prefact1 = alpha * prefact2 / d * (3.0 * lsum / d - dlsum);
                    self.jerk[j] += dr * (prefact1 * m_i);
                    self.jerk[i] -= dr * (prefact1 * m_j);
                }
            }
            for i in n_active..n {
                if sim.interrupt_requested() {
                    return;
                }
                let mi = self.map[shell][i];
                for j in starti..n_active {
                    let mj = self.map[shell][j];
                    let dr = sim.bodies[mj].pos - sim.bodies[mi].pos;
                    let da = sim.bodies[mj].acc - sim.bodies[mi].acc;
                    let d = dr.norm();
                    let skip_outer = self.whsplitting && shell == 1 && j == 0;
                    let (dc_o, dc_c, dc_i) = self.pair_bands(shell, mi, mj, skip_outer);
                    let (lsum, dlsum) = lsum_band(d, dc_o, dc_c, dc_i, &sw);
                    let alpha = da.dot(&dr);
                    let prefact2 = 2.0 * g / (d * d * d);
                    let m_j = sim.bodies[mj].m;
                    let prefact1 = alpha * prefact2 / d * (3.0 * lsum / d - dlsum);
                    self.jerk[i] += da * (lsum * prefact2 * m_j);
                    self.jerk[i] -= dr * (prefact1 * m_j);
                    if symmetric_testparticles {
                        let m_i = sim.bodies[mi].m;
                        self.jerk[j] += dr * (prefact1 * m_i);
                        self.jerk[j] -= da * (lsum * prefact2 * m_i);
                    }
                }
            }
            if shell == 0 {
                if let Some(hook) = sim.additional_forces {
                    hook(sim);
                }
            }
            for i in 0..n {
                let mi = self.map[shell][i];
                let acc = sim.bodies[mi].acc;
                let jerk = self.jerk[i];
                sim.bodies[mi].vel += acc * y + jerk * v_coeff;
            }
        } else {
            if shell == 0 {
                if let Some(hook) = sim.additional_forces {
                    hook(sim);
                }
            }
            for i in 0..n {
                let mi = self.map[shell][i];
                let acc = sim.bodies[mi].acc;
                sim.bodies[mi].vel += acc * y;
            }
        }
    }
}
