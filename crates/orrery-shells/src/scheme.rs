//! Operator-splitting schedules and their coefficient tables.
//!
//! A schedule is a fixed sequence of drift and kick operations whose
//! coefficients are expressed in units of the step (`dt` for drifts and kick
//! weights, `dt³` for the force-gradient weight). Kernels compose one step;
//! processed schedules additionally carry a processor sequence applied once
//! before the first step, and inverted (reverse order, negated step) at
//! synchronization, so that `pre ∘ N·step ∘ post` is the intended operator.
//!
//! The tables are stored verbatim at full double precision; composition
//! correctness depends on them bit-for-bit.

use serde::{Deserialize, Serialize};

/// One sub-step of a schedule. Coefficients are in units of the step:
/// a drift advances positions by `c·dt·v`, a kick advances velocities by
/// `y·dt·a + v·dt³·j` where `j` is the jerk (only force-gradient schedules
/// have `v != 0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Drift(f64),
    Kick { y: f64, v: f64 },
}

/// The available stepping schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scheme {
    /// Second-order leapfrog (drift-kick-drift).
    #[default]
    Leapfrog,
    /// Fourth-order Yoshida triple jump.
    Lf4,
    /// Sixth-order Kahan–Li nine-stage composition.
    Lf6,
    /// Eighth-order Kahan–Li seventeen-stage composition.
    Lf8,
    /// Two-force-evaluation method, fourth order in the dominant term.
    Lf42,
    /// (8,6,4) palindromic two-table method.
    Lf864,
    /// Processed modified leapfrog, fourth order, using the force gradient.
    Pmlf4,
    /// Processed modified kernel on Gauss nodes, sixth order, using the
    /// force gradient.
    Pmlf6,
    /// Processed leapfrog, (7,6,4).
    Plf764,
}

// Yoshida's fourth-order triple jump: 1/(2(2 - 2^(1/3))).
const LF4_A: f64 = 0.675603595979828817023843904487;

// Kahan & Li, nine-stage symmetric composition of order six.
const LF6_G: [f64; 5] = [
    0.39216144400731413927925056,
    0.33259913678935943859974864,
    -0.70624617255763935980996482,
    0.08221359629355080023149045,
    0.79854399093482996339895035,
];

// Kahan & Li, seventeen-stage symmetric composition of order eight.
const LF8_G: [f64; 9] = [
    0.13020248308889008087881763,
    0.56116298177510838456196441,
    -0.38947496264484728640807860,
    0.15884190655515560089621075,
    -0.39590389413323757733623154,
    0.18453964097831570709183254,
    0.25837438768632204729397911,
    0.29501172360931029887096624,
    -0.60550853383003451169892108,
];

// Two-stage method with drift coefficient 1/2 - sqrt(3)/6.
const LF42_A: f64 = 0.211324865405187117745425609749;

// (8,6,4) palindromic drift/kick tables.
const LF864_A: [f64; 4] = [
    0.0711334264982231177779387300061549964174,
    0.241153427956640098736487795326289649618,
    0.521411761772814789212136078067994229991,
    -0.333698616227678005726562603400438876027,
];
const LF864_B: [f64; 4] = [
    0.183083687472197221961703757166430291072,
    0.310782859898574869507522291054262796375,
    -0.0265646185119588006972121379164987592663,
    0.0653961422823734184559721793911134363710,
];

// Processed modified leapfrog, order four. The kernel is the plain leapfrog
// with the force-gradient weight dt³/24; the processor is three kick/drift
// stages.
const PMLF4_Z: [f64; 3] = [
    0.8621702655946487,
    -0.7095907852246288,
    -0.1525794803700199,
];
const PMLF4_Y: [f64; 3] = [
    -0.6708886677394832,
    0.2229295709441891,
    0.4479590967952941,
];

// Processed modified kernel on the three Gauss–Legendre nodes with their
// quadrature weights as kick coefficients; order six after processing.
const PMLF6_A: [f64; 2] = [
    0.112701665379258311482073460022,
    0.387298334620741688517926539978,
];
const PMLF6_B: [f64; 2] = [
    0.277777777777777777777777777778,
    0.444444444444444444444444444444,
];
const PMLF6_C: [f64; 2] = [
    -0.000462962962962962962962962963,
    -0.004629629629629629629629629630,
];
const PMLF6_Z: [f64; 6] = [
    0.0681515287869243,
    -0.1278590034561287,
    0.0562745442636860,
    0.0907697969098676,
    -0.1239125963368507,
    0.0365757298325015,
];
const PMLF6_Y: [f64; 6] = [
    -0.0924646112077232,
    0.1512356932493021,
    -0.0743339406109649,
    0.0398891052157742,
    0.0621568968458569,
    -0.0864831434922451,
];
const PMLF6_V: [f64; 6] = [
    0.0004573019772308,
    -0.0007533387306329,
    0.0003029629571557,
    0.0002789010129915,
    -0.0006044347929366,
    0.0003186075761915,
];

// Processed leapfrog (7,6,4): two-table palindromic kernel plus a six-stage
// processor.
const PLF764_A: [f64; 2] = [0.5600879810924619, -0.0600879810924619];
const PLF764_B: [f64; 2] = [1.5171479707207228, -2.0342959414414456];
const PLF764_Z: [f64; 6] = [
    -0.3346222298730800,
    1.0975679907321640,
    -1.0380887460967830,
    0.6234776317921379,
    -1.1027532063031910,
    0.7544185597487521,
];
const PLF764_Y: [f64; 6] = [
    -1.6218101180868010,
    0.0061709468110142,
    0.8348493592472594,
    -0.0511253369989315,
    0.5633782670698199,
    0.2685368819576390,
];

const fn kick(y: f64) -> Op {
    Op::Kick { y, v: 0.0 }
}

static LF_OPS: [Op; 3] = [Op::Drift(0.5), kick(1.0), Op::Drift(0.5)];

static LF4_OPS: [Op; 7] = [
    Op::Drift(LF4_A),
    kick(2.0 * LF4_A),
    Op::Drift(0.5 - LF4_A),
    kick(1.0 - 4.0 * LF4_A),
    Op::Drift(0.5 - LF4_A),
    kick(2.0 * LF4_A),
    Op::Drift(LF4_A),
];

static LF6_OPS: [Op; 19] = [
    Op::Drift(0.5 * LF6_G[0]),
    kick(LF6_G[0]),
    Op::Drift(0.5 * (LF6_G[0] + LF6_G[1])),
    kick(LF6_G[1]),
    Op::Drift(0.5 * (LF6_G[1] + LF6_G[2])),
    kick(LF6_G[2]),
    Op::Drift(0.5 * (LF6_G[2] + LF6_G[3])),
    kick(LF6_G[3]),
    Op::Drift(0.5 * (LF6_G[3] + LF6_G[4])),
    kick(LF6_G[4]),
    Op::Drift(0.5 * (LF6_G[3] + LF6_G[4])),
    kick(LF6_G[3]),
    Op::Drift(0.5 * (LF6_G[2] + LF6_G[3])),
    kick(LF6_G[2]),
    Op::Drift(0.5 * (LF6_G[1] + LF6_G[2])),
    kick(LF6_G[1]),
    Op::Drift(0.5 * (LF6_G[0] + LF6_G[1])),
    kick(LF6_G[0]),
    Op::Drift(0.5 * LF6_G[0]),
];

static LF8_OPS: [Op; 35] = [
    Op::Drift(0.5 * LF8_G[0]),
    kick(LF8_G[0]),
    Op::Drift(0.5 * (LF8_G[0] + LF8_G[1])),
    kick(LF8_G[1]),
    Op::Drift(0.5 * (LF8_G[1] + LF8_G[2])),
    kick(LF8_G[2]),
    Op::Drift(0.5 * (LF8_G[2] + LF8_G[3])),
    kick(LF8_G[3]),
    Op::Drift(0.5 * (LF8_G[3] + LF8_G[4])),
    kick(LF8_G[4]),
    Op::Drift(0.5 * (LF8_G[4] + LF8_G[5])),
    kick(LF8_G[5]),
    Op::Drift(0.5 * (LF8_G[5] + LF8_G[6])),
    kick(LF8_G[6]),
    Op::Drift(0.5 * (LF8_G[6] + LF8_G[7])),
    kick(LF8_G[7]),
    Op::Drift(0.5 * (LF8_G[7] + LF8_G[8])),
    kick(LF8_G[8]),
    Op::Drift(0.5 * (LF8_G[7] + LF8_G[8])),
    kick(LF8_G[7]),
    Op::Drift(0.5 * (LF8_G[6] + LF8_G[7])),
    kick(LF8_G[6]),
    Op::Drift(0.5 * (LF8_G[5] + LF8_G[6])),
    kick(LF8_G[5]),
    Op::Drift(0.5 * (LF8_G[4] + LF8_G[5])),
    kick(LF8_G[4]),
    Op::Drift(0.5 * (LF8_G[3] + LF8_G[4])),
    kick(LF8_G[3]),
    Op::Drift(0.5 * (LF8_G[2] + LF8_G[3])),
    kick(LF8_G[2]),
    Op::Drift(0.5 * (LF8_G[1] + LF8_G[2])),
    kick(LF8_G[1]),
    Op::Drift(0.5 * (LF8_G[0] + LF8_G[1])),
    kick(LF8_G[0]),
    Op::Drift(0.5 * LF8_G[0]),
];

static LF42_OPS: [Op; 5] = [
    Op::Drift(LF42_A),
    kick(0.5),
    Op::Drift(1.0 - 2.0 * LF42_A),
    kick(0.5),
    Op::Drift(LF42_A),
];

static LF864_OPS: [Op; 15] = [
    Op::Drift(LF864_A[0]),
    kick(LF864_B[0]),
    Op::Drift(LF864_A[1]),
    kick(LF864_B[1]),
    Op::Drift(LF864_A[2]),
    kick(LF864_B[2]),
    Op::Drift(LF864_A[3]),
    kick(LF864_B[3]),
    Op::Drift(LF864_A[3]),
    kick(LF864_B[2]),
    Op::Drift(LF864_A[2]),
    kick(LF864_B[1]),
    Op::Drift(LF864_A[1]),
    kick(LF864_B[0]),
    Op::Drift(LF864_A[0]),
];

static PMLF4_OPS: [Op; 3] = [
    Op::Drift(0.5),
    Op::Kick {
        y: 1.0,
        v: 1.0 / 24.0,
    },
    Op::Drift(0.5),
];

static PMLF4_PROC: [Op; 6] = [
    kick(PMLF4_Y[0]),
    Op::Drift(PMLF4_Z[0]),
    kick(PMLF4_Y[1]),
    Op::Drift(PMLF4_Z[1]),
    kick(PMLF4_Y[2]),
    Op::Drift(PMLF4_Z[2]),
];

static PMLF6_OPS: [Op; 7] = [
    Op::Drift(PMLF6_A[0]),
    Op::Kick {
        y: PMLF6_B[0],
        v: PMLF6_C[0],
    },
    Op::Drift(PMLF6_A[1]),
    Op::Kick {
        y: PMLF6_B[1],
        v: PMLF6_C[1],
    },
    Op::Drift(PMLF6_A[1]),
    Op::Kick {
        y: PMLF6_B[0],
        v: PMLF6_C[0],
    },
    Op::Drift(PMLF6_A[0]),
];

static PMLF6_PROC: [Op; 12] = [
    Op::Drift(PMLF6_Z[0]),
    Op::Kick {
        y: PMLF6_Y[0],
        v: PMLF6_V[0],
    },
    Op::Drift(PMLF6_Z[1]),
    Op::Kick {
        y: PMLF6_Y[1],
        v: PMLF6_V[1],
    },
    Op::Drift(PMLF6_Z[2]),
    Op::Kick {
        y: PMLF6_Y[2],
        v: PMLF6_V[2],
    },
    Op::Drift(PMLF6_Z[3]),
    Op::Kick {
        y: PMLF6_Y[3],
        v: PMLF6_V[3],
    },
    Op::Drift(PMLF6_Z[4]),
    Op::Kick {
        y: PMLF6_Y[4],
        v: PMLF6_V[4],
    },
    Op::Drift(PMLF6_Z[5]),
    Op::Kick {
        y: PMLF6_Y[5],
        v: PMLF6_V[5],
    },
];

static PLF764_OPS: [Op; 7] = [
    Op::Drift(PLF764_A[0]),
    kick(PLF764_B[0]),
    Op::Drift(PLF764_A[1]),
    kick(PLF764_B[1]),
    Op::Drift(PLF764_A[1]),
    kick(PLF764_B[0]),
    Op::Drift(PLF764_A[0]),
];

static PLF764_PROC: [Op; 12] = [
    Op::Drift(PLF764_Z[0]),
    kick(PLF764_Y[0]),
    Op::Drift(PLF764_Z[1]),
    kick(PLF764_Y[1]),
    Op::Drift(PLF764_Z[2]),
    kick(PLF764_Y[2]),
    Op::Drift(PLF764_Z[3]),
    kick(PLF764_Y[3]),
    Op::Drift(PLF764_Z[4]),
    kick(PLF764_Y[4]),
    Op::Drift(PLF764_Z[5]),
    kick(PLF764_Y[5]),
];

impl Scheme {
    /// The operation sequence composing one step.
    pub fn kernel(self) -> &'static [Op] {
        match self {
            Scheme::Leapfrog => &LF_OPS,
            Scheme::Lf4 => &LF4_OPS,
            Scheme::Lf6 => &LF6_OPS,
            Scheme::Lf8 => &LF8_OPS,
            Scheme::Lf42 => &LF42_OPS,
            Scheme::Lf864 => &LF864_OPS,
            Scheme::Pmlf4 => &PMLF4_OPS,
            Scheme::Pmlf6 => &PMLF6_OPS,
            Scheme::Plf764 => &PLF764_OPS,
        }
    }

    /// The preprocessor sequence; empty for unprocessed schemes. The
    /// postprocessor is this sequence traversed in reverse with negated
    /// step, making the pair an exact inverse.
    pub fn processor(self) -> &'static [Op] {
        match self {
            Scheme::Pmlf4 => &PMLF4_PROC,
            Scheme::Pmlf6 => &PMLF6_PROC,
            Scheme::Plf764 => &PLF764_PROC,
            _ => &[],
        }
    }

    /// Whether any kick in the kernel or processor carries a force-gradient
    /// (jerk) weight.
    pub fn uses_jerk(self) -> bool {
        matches!(self, Scheme::Pmlf4 | Scheme::Pmlf6)
    }

    /// Whether the scheme has processor stages.
    pub fn is_processed(self) -> bool {
        !self.processor().is_empty()
    }

    pub const ALL: [Scheme; 9] = [
        Scheme::Leapfrog,
        Scheme::Lf4,
        Scheme::Lf6,
        Scheme::Lf8,
        Scheme::Lf42,
        Scheme::Lf864,
        Scheme::Pmlf4,
        Scheme::Pmlf6,
        Scheme::Plf764,
    ];
}
