//! Recursive FFT over real input with a direct-transform fallback.
//!
//! The frame length is 400 = 2^4 * 25, so the even/odd recursion bottoms out
//! on odd 25-point subproblems; those fall back to an O(n²) DFT rather than
//! requiring power-of-two sizes. Both functions are pure over exclusively
//! owned buffers and are safe to call from independent worker threads.

use std::f32::consts::PI;

/// Direct O(n²) discrete Fourier transform of a real input.
///
/// `out` receives interleaved re/im pairs, length `2 * input.len()`.
pub fn dft(input: &[f32], out: &mut Vec<f32>) {
    let n = input.len();
    out.clear();
    out.reserve(2 * n);

    for k in 0..n {
        let mut re = 0.0f32;
        let mut im = 0.0f32;
        for (j, &x) in input.iter().enumerate() {
            // Reduce k*j modulo n to keep the angle in [0, 2π) for f32 accuracy.
            let angle = 2.0 * PI * ((k * j) % n) as f32 / n as f32;
            re += x * angle.cos();
            im -= x * angle.sin();
        }
        out.push(re);
        out.push(im);
    }
}

/// Recursive even/odd-split FFT of a real input.
///
/// Arbitrary sizes are supported: an odd-length subproblem falls back to
/// [`dft`]. `out` receives interleaved re/im pairs, length `2 * input.len()`.
pub fn fft(input: &[f32], out: &mut Vec<f32>) {
    let n = input.len();
    if n == 0 {
        out.clear();
        return;
    }
    if n == 1 {
        out.clear();
        out.push(input[0]);
        out.push(0.0);
        return;
    }
    if n % 2 == 1 {
        dft(input, out);
        return;
    }

    let even: Vec<f32> = input.iter().step_by(2).copied().collect();
    let odd: Vec<f32> = input[1..].iter().step_by(2).copied().collect();

    let mut even_out = Vec::new();
    let mut odd_out = Vec::new();
    fft(&even, &mut even_out);
    fft(&odd, &mut odd_out);

    out.clear();
    out.resize(2 * n, 0.0);
    let half = n / 2;
    for k in 0..half {
        let theta = 2.0 * PI * k as f32 / n as f32;
        let (sin, cos) = theta.sin_cos();

        let re_e = even_out[2 * k];
        let im_e = even_out[2 * k + 1];
        let re_o = odd_out[2 * k];
        let im_o = odd_out[2 * k + 1];

        // Twiddle e^{-iθ} applied to the odd half.
        let re_t = cos * re_o + sin * im_o;
        let im_t = cos * im_o - sin * re_o;

        out[2 * k] = re_e + re_t;
        out[2 * k + 1] = im_e + im_t;
        out[2 * (k + half)] = re_e - re_t;
        out[2 * (k + half) + 1] = im_e - im_t;
    }
}
