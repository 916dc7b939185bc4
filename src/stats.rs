//! Two-sample statistics primitives
//!
//! Pure functions over numeric slices used by the drift detectors and
//! performance metrics. P-values use the standard asymptotic
//! approximations; exact small-sample distributions are out of scope.

use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::gamma::ln_gamma;

/// Sort a copy of the input, NaN-free by contract
fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    v
}

/// Linear-interpolation quantile over a sorted slice, q in [0, 1]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Mean of a non-empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Midrank (tie-averaged, 1-based) ranks of a slice
pub fn midranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| values[i].partial_cmp(&values[j]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // ties share the average of their 1-based positions
        let avg = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Survival function of the Kolmogorov distribution
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=1000 {
        let term = sign * (-2.0 * (j as f64).powi(2) * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-12 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Two-sample Kolmogorov-Smirnov test
///
/// Returns (statistic, p_value) using the asymptotic Kolmogorov
/// distribution with the Stephens small-sample correction.
pub fn ks_2samp(a: &[f64], b: &[f64]) -> (f64, f64) {
    let sa = sorted(a);
    let sb = sorted(b);
    let (na, nb) = (sa.len() as f64, sb.len() as f64);

    let mut d: f64 = 0.0;
    let (mut i, mut j) = (0usize, 0usize);
    while i < sa.len() && j < sb.len() {
        let x = sa[i].min(sb[j]);
        while i < sa.len() && sa[i] <= x {
            i += 1;
        }
        while j < sb.len() && sb[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / na - j as f64 / nb).abs());
    }

    let ne = (na * nb / (na + nb)).sqrt();
    let lambda = (ne + 0.12 + 0.11 / ne) * d;
    (d, kolmogorov_survival(lambda))
}

/// Survival function of the chi-squared distribution
pub fn chi2_survival(stat: f64, dof: f64) -> f64 {
    match ChiSquared::new(dof) {
        Ok(chi2) => (1.0 - chi2.cdf(stat)).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

/// One-dimensional Wasserstein (earth mover's) distance
pub fn wasserstein_distance(a: &[f64], b: &[f64]) -> f64 {
    let sa = sorted(a);
    let sb = sorted(b);
    let (na, nb) = (sa.len() as f64, sb.len() as f64);

    let mut all: Vec<f64> = sa.iter().chain(sb.iter()).copied().collect();
    all.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

    let mut distance = 0.0;
    for w in all.windows(2) {
        let delta = w[1] - w[0];
        if delta <= 0.0 {
            continue;
        }
        let ca = sa.partition_point(|&v| v <= w[0]) as f64 / na;
        let cb = sb.partition_point(|&v| v <= w[0]) as f64 / nb;
        distance += (ca - cb).abs() * delta;
    }
    distance
}

/// Least-squares quadratic fit, returns [c0, c1, c2] for c0 + c1 x + c2 x^2
fn quad_fit(xs: &[f64], ys: &[f64]) -> [f64; 3] {
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut t0, mut t1, mut t2) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let x2 = x * x;
        s1 += x;
        s2 += x2;
        s3 += x2 * x;
        s4 += x2 * x2;
        t0 += y;
        t1 += x * y;
        t2 += x2 * y;
    }
    let s0 = xs.len() as f64;
    let det3 = |m: [[f64; 3]; 3]| -> f64 {
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    };
    let d = det3([[s0, s1, s2], [s1, s2, s3], [s2, s3, s4]]);
    let c0 = det3([[t0, s1, s2], [t1, s2, s3], [t2, s3, s4]]) / d;
    let c1 = det3([[s0, t0, s2], [s1, t1, s3], [s2, t2, s4]]) / d;
    let c2 = det3([[s0, s1, t0], [s1, s2, t1], [s2, s3, t2]]) / d;
    [c0, c1, c2]
}

/// Two-sample Anderson-Darling test (Scholz-Stephens, midrank version)
///
/// Returns (standardized statistic, p_value). The p-value comes from the
/// published critical-value interpolation and is clamped to
/// [0.001, 0.25], the range the approximation covers.
pub fn anderson_darling_2samp(a: &[f64], b: &[f64]) -> (f64, f64) {
    let samples = [sorted(a), sorted(b)];
    let n = [a.len() as f64, b.len() as f64];
    let big_n = a.len() + b.len();
    let nf = big_n as f64;

    let mut pooled: Vec<f64> = samples[0].iter().chain(samples[1].iter()).copied().collect();
    pooled.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    let mut distinct = pooled.clone();
    distinct.dedup();

    let mut a2 = 0.0;
    for (si, sample) in samples.iter().enumerate() {
        let mut inner = 0.0;
        for z in &distinct {
            let left = pooled.partition_point(|&v| v < *z) as f64;
            let right = pooled.partition_point(|&v| v <= *z) as f64;
            let lj = right - left;
            let bj = left + lj / 2.0;

            let s_left = sample.partition_point(|&v| v < *z) as f64;
            let s_right = sample.partition_point(|&v| v <= *z) as f64;
            let fij = s_right - s_left;
            let mij = s_right - fij / 2.0;

            let denom = bj * (nf - bj) - nf * lj / 4.0;
            if denom <= 0.0 {
                // all pooled mass on a single value: numerator is zero too
                continue;
            }
            inner += lj / nf * (nf * mij - bj * n[si]).powi(2) / denom;
        }
        a2 += inner / n[si];
    }
    a2 *= (nf - 1.0) / nf;

    // variance of A2 under the null (Scholz-Stephens eq. 4-7, k = 2)
    let k = 2.0;
    let h_cap: f64 = n.iter().map(|ni| 1.0 / ni).sum();
    let h: f64 = (1..big_n).map(|i| 1.0 / i as f64).sum();
    let mut suffix = vec![0.0; big_n + 1];
    for j in (1..big_n).rev() {
        suffix[j] = suffix[j + 1] + 1.0 / j as f64;
    }
    let mut g = 0.0;
    for i in 1..big_n.saturating_sub(1) {
        g += suffix[i + 1] / (nf - i as f64);
    }

    let ca = (4.0 * g - 6.0) * (k - 1.0) + (10.0 - 6.0 * g) * h_cap;
    let cb = (2.0 * g - 4.0) * k * k + 8.0 * h * k + (2.0 * g - 14.0 * h - 4.0) * h_cap
        - 8.0 * h
        + 4.0 * g
        - 6.0;
    let cc = (6.0 * h + 2.0 * g - 2.0) * k * k + (4.0 * h - 4.0 * g + 6.0) * k
        + (2.0 * h - 6.0) * h_cap
        + 4.0 * h;
    let cd = (2.0 * h + 6.0) * k * k - 4.0 * h * k;
    let sigma_sq =
        (ca * nf.powi(3) + cb * nf.powi(2) + cc * nf + cd) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));

    let m = k - 1.0;
    if !(sigma_sq > 0.0) {
        return (0.0, 0.25);
    }
    let standardized = (a2 - m) / sigma_sq.sqrt();

    // interpolate log significance vs. critical value (m = 1 row)
    let b0 = [0.675, 1.281, 1.645, 1.960, 2.326, 2.573, 3.085];
    let b1 = [-0.245, 0.250, 0.678, 1.149, 1.822, 2.364, 3.615];
    let b2 = [-0.105, -0.305, -0.362, -0.391, -0.396, -0.345, -0.154];
    let sig = [0.25, 0.1, 0.05, 0.025, 0.01, 0.005, 0.001];
    let critical: Vec<f64> = (0..7)
        .map(|i| b0[i] + b1[i] / m.sqrt() + b2[i] / m)
        .collect();
    let log_sig: Vec<f64> = sig.iter().map(|s: &f64| s.ln()).collect();
    let c = quad_fit(&critical, &log_sig);

    let p = (c[0] + c[1] * standardized + c[2] * standardized * standardized).exp();
    (standardized, p.clamp(0.001, 0.25))
}

/// exp(-q) * K_{1/4}(q), computed by quadrature of the integral
/// representation so large q never overflows
fn scaled_bessel_k_quarter(q: f64) -> f64 {
    // K_v(q) = int_0^inf exp(-q cosh t) cosh(v t) dt
    let t_max = 25.0;
    let steps = 2000usize;
    let h = t_max / steps as f64;
    let f = |t: f64| (-q * (1.0 + t.cosh())).exp() * (0.25 * t).cosh();
    let mut sum = f(0.0) + f(t_max);
    for i in 1..steps {
        let w = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * f(i as f64 * h);
    }
    sum * h / 3.0
}

/// CDF of the limiting distribution of the Cramer-von Mises statistic
fn cvm_limit_cdf(x: f64) -> f64 {
    let mut total = 0.0;
    for k in 0..100u32 {
        let kf = f64::from(k);
        let u = (ln_gamma(kf + 0.5) - ln_gamma(kf + 1.0)).exp()
            / (std::f64::consts::PI.powf(1.5) * x.sqrt());
        let y = 4.0 * kf + 1.0;
        let q = y * y / (16.0 * x);
        let term = u * y.sqrt() * scaled_bessel_k_quarter(q);
        total += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    total.clamp(0.0, 1.0)
}

/// Two-sample Cramer-von Mises test
///
/// Returns (statistic, p_value) with the asymptotic p-value from the
/// limiting distribution of the normalized rank statistic.
pub fn cramer_von_mises_2samp(a: &[f64], b: &[f64]) -> (f64, f64) {
    let (nx, ny) = (a.len(), b.len());
    let (nxf, nyf) = (nx as f64, ny as f64);
    let nf = (nx + ny) as f64;

    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let ranks = midranks(&pooled);
    let mut rx: Vec<f64> = ranks[..nx].to_vec();
    let mut ry: Vec<f64> = ranks[nx..].to_vec();
    rx.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    ry.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

    let mut u = nxf
        * rx.iter()
            .enumerate()
            .map(|(i, r)| (r - (i + 1) as f64).powi(2))
            .sum::<f64>();
    u += nyf
        * ry.iter()
            .enumerate()
            .map(|(j, r)| (r - (j + 1) as f64).powi(2))
            .sum::<f64>();

    let nm = nxf * nyf;
    let t = u / (nm * nf) - (4.0 * nm - 1.0) / (6.0 * nf);

    let et = (1.0 + 1.0 / nf) / 6.0;
    let vt = (nf + 1.0) * (4.0 * nm * nf - 3.0 * (nxf * nxf + nyf * nyf) - 2.0 * nm)
        / (45.0 * nf * nf * 4.0 * nm);
    let tn = 1.0 / 6.0 + (t - et) / (45.0 * vt).sqrt();

    let p = if tn < 0.003 {
        1.0
    } else {
        (1.0 - cvm_limit_cdf(tn)).max(0.0)
    };
    (t, p)
}

/// AUC-ROC as the Mann-Whitney U statistic normalized by pos x neg counts
///
/// Returns 0.5 when either class is absent.
pub fn mann_whitney_auc(positives: &[f64], negatives: &[f64]) -> f64 {
    if positives.is_empty() || negatives.is_empty() {
        return 0.5;
    }
    let pooled: Vec<f64> = positives.iter().chain(negatives.iter()).copied().collect();
    let ranks = midranks(&pooled);
    let n_pos = positives.len() as f64;
    let n_neg = negatives.len() as f64;
    let rank_sum: f64 = ranks[..positives.len()].iter().sum();
    let u = rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    u / (n_pos * n_neg)
}
