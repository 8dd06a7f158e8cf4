/// Multilinear coefficient interpolation over a static lookup table.
///
/// The table is row-major with the last input dimension contiguous and each
/// table entry holding an output vector of `num_out_dims` coefficients.
use crate::error::{EqError, Result};
use crate::fixed::Coef;

/// Maximum number of input dimensions.
pub const MAX_IN_DIMS: usize = 8;

/// Maximum number of output dimensions.
pub const MAX_OUT_DIMS: usize = 8;

/// N-dimensional interpolator over a borrowed coefficient table
#[derive(Debug, Clone)]
pub struct CoefInterpolator {
    num_in_dims: usize,
    in_dims: [usize; MAX_IN_DIMS],
    // Table stride of one step along each input dimension
    in_dim_offsets: [usize; MAX_IN_DIMS],
    num_out_dims: usize,
    table: &'static [Coef],
}

impl CoefInterpolator {
    /// Create an interpolator for `table`, shaped `in_dims × num_out_dims`.
    pub fn new(in_dims: &[usize], num_out_dims: usize, table: &'static [Coef]) -> Result<Self> {
        if in_dims.is_empty() || in_dims.len() > MAX_IN_DIMS {
            return Err(EqError::InvalidTable(format!(
                "{} input dimensions (1..={} supported)",
                in_dims.len(),
                MAX_IN_DIMS
            )));
        }
        if num_out_dims == 0 || num_out_dims > MAX_OUT_DIMS {
            return Err(EqError::InvalidTable(format!(
                "{} output dimensions (1..={} supported)",
                num_out_dims, MAX_OUT_DIMS
            )));
        }
        if in_dims.contains(&0) {
            return Err(EqError::InvalidTable(format!(
                "zero-sized input dimension in {:?}",
                in_dims
            )));
        }

        let expected = in_dims.iter().product::<usize>() * num_out_dims;
        if table.len() != expected {
            return Err(EqError::InvalidTable(format!(
                "table has {} entries, dimensions {:?} x {} need {}",
                table.len(),
                in_dims,
                num_out_dims,
                expected
            )));
        }

        let num_in_dims = in_dims.len();
        let mut dims = [0; MAX_IN_DIMS];
        dims[..num_in_dims].copy_from_slice(in_dims);

        let mut in_dim_offsets = [0; MAX_IN_DIMS];
        in_dim_offsets[num_in_dims - 1] = num_out_dims;
        for dim in (0..num_in_dims - 1).rev() {
            in_dim_offsets[dim] = in_dim_offsets[dim + 1] * dims[dim + 1];
        }

        Ok(Self {
            num_in_dims,
            in_dims: dims,
            in_dim_offsets,
            num_out_dims,
            table,
        })
    }

    /// Size of each input dimension
    pub fn in_dims(&self) -> &[usize] {
        &self.in_dims[..self.num_in_dims]
    }

    /// Number of coefficients per output vector
    pub fn num_out_dims(&self) -> usize {
        self.num_out_dims
    }

    /// Table stride of each input dimension
    pub fn strides(&self) -> &[usize] {
        &self.in_dim_offsets[..self.num_in_dims]
    }

    /// Interpolated output vector at the given coordinate.
    ///
    /// Only the first [`num_out_dims`](Self::num_out_dims) entries are
    /// meaningful.
    pub fn coefficients(&self, int_coord: &[i32], frac_coord: &[u32]) -> [Coef; MAX_OUT_DIMS] {
        let mut out = [0; MAX_OUT_DIMS];
        self.coefficients_into(int_coord, frac_coord, &mut out);
        out
    }

    /// Interpolated output vector written into `out`.
    ///
    /// Each input dimension takes an integer index plus a 32-bit fraction
    /// (numerator over 2^32). Coordinates outside the table clamp to the
    /// nearest edge with their fraction dropped, so any coordinate is safe.
    pub fn coefficients_into(&self, int_coord: &[i32], frac_coord: &[u32], out: &mut [Coef]) {
        debug_assert_eq!(int_coord.len(), self.num_in_dims);
        debug_assert_eq!(frac_coord.len(), self.num_in_dims);
        debug_assert!(out.len() >= self.num_out_dims);

        let mut frac = [0u32; MAX_IN_DIMS];
        let mut index = 0;
        for dim in 0..self.num_in_dims {
            let last = self.in_dims[dim] - 1;
            let coord = int_coord[dim];
            if coord < 0 {
                frac[dim] = 0;
            } else if coord as usize >= last {
                frac[dim] = 0;
                index += self.in_dim_offsets[dim] * last;
            } else {
                frac[dim] = frac_coord[dim];
                index += self.in_dim_offsets[dim] * coord as usize;
            }
        }

        let mut result = [0; MAX_OUT_DIMS];
        self.interpolate(index, &frac, &mut result, 0);
        out[..self.num_out_dims].copy_from_slice(&result[..self.num_out_dims]);
    }

    // Resolves dimensions deeper than `dim` first, then blends along `dim`.
    fn interpolate(
        &self,
        index: usize,
        frac: &[u32; MAX_IN_DIMS],
        out: &mut [Coef; MAX_OUT_DIMS],
        dim: usize,
    ) {
        let n = self.num_out_dims;
        if dim == self.num_in_dims {
            out[..n].copy_from_slice(&self.table[index..index + n]);
            return;
        }

        self.interpolate(index, frac, out, dim + 1);
        if frac[dim] != 0 {
            let mut hi = [0; MAX_OUT_DIMS];
            self.interpolate(index + self.in_dim_offsets[dim], frac, &mut hi, dim + 1);
            for (lo, hi) in out[..n].iter_mut().zip(&hi[..n]) {
                *lo = blend(*lo, *hi, frac[dim]);
            }
        }
    }
}

/// `lo + (hi - lo) * frac / 2^32`, rounded half away from zero.
///
/// Symmetric rounding keeps columns that are exact negations of each other
/// exactly negated after interpolation.
#[inline]
fn blend(lo: Coef, hi: Coef, frac: u32) -> Coef {
    let delta = i128::from(i64::from(hi) - i64::from(lo)) * i128::from(frac);
    let half = 1i128 << 31;
    let step = if delta >= 0 {
        (delta + half) >> 32
    } else {
        -((-delta + half) >> 32)
    };
    (i64::from(lo) + step as i64) as Coef
}

#[cfg(test)]
mod tests {
    use super::*;

    static LINE: [Coef; 4] = [0, 1000, -1000, 2_000_000_000];

    static GRID: [Coef; 12] = [
        // [row 0][col 0..3][2 outputs]
        0, 10, 100, 20, 200, 30, //
        // [row 1]
        1000, 40, 1100, 50, 1200, 60,
    ];

    #[test]
    fn strides_are_row_major() {
        static TABLE: [Coef; 9 * 4 * 15 * 5] = [0; 9 * 4 * 15 * 5];
        let interp = CoefInterpolator::new(&[9, 4, 15], 5, &TABLE).unwrap();
        assert_eq!(interp.strides(), &[300, 75, 5]);
        assert_eq!(interp.in_dims(), &[9, 4, 15]);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(CoefInterpolator::new(&[], 1, &LINE).is_err());
        assert!(CoefInterpolator::new(&[4], 0, &LINE).is_err());
        assert!(CoefInterpolator::new(&[4], 9, &LINE).is_err());
        assert!(CoefInterpolator::new(&[5], 1, &LINE).is_err());
        assert!(CoefInterpolator::new(&[1; 9], 1, &LINE[..1]).is_err());
        assert!(CoefInterpolator::new(&[4, 0], 1, &LINE).is_err());
    }

    #[test]
    fn integer_coordinates_read_table() {
        let interp = CoefInterpolator::new(&[4], 1, &LINE).unwrap();
        for (i, v) in LINE.iter().enumerate() {
            assert_eq!(interp.coefficients(&[i as i32], &[0])[0], *v);
        }
    }

    #[test]
    fn half_fraction_is_midpoint() {
        let interp = CoefInterpolator::new(&[4], 1, &LINE).unwrap();
        assert_eq!(interp.coefficients(&[0], &[1 << 31])[0], 500);
        assert_eq!(interp.coefficients(&[1], &[1 << 31])[0], 0);
        assert_eq!(interp.coefficients(&[1], &[1 << 30])[0], 500);
    }

    #[test]
    fn blend_rounding_is_symmetric() {
        // 1/3 of the way between 0 and +-1000.
        let third = 0x5555_5555;
        assert_eq!(blend(0, 1000, third), 333);
        assert_eq!(blend(0, -1000, third), -333);
        assert_eq!(blend(0, 3, 1 << 31), 2);
        assert_eq!(blend(0, -3, 1 << 31), -2);
    }

    #[test]
    fn blend_handles_full_range() {
        assert_eq!(blend(Coef::MIN, Coef::MAX, 0), Coef::MIN);
        // The largest fraction stops one unit short of the upper entry.
        assert_eq!(blend(Coef::MIN, Coef::MAX, u32::MAX), Coef::MAX - 1);
        assert_eq!(blend(Coef::MAX, Coef::MIN, u32::MAX), Coef::MIN + 1);
    }

    #[test]
    fn negative_coordinate_clamps_to_first_entry() {
        let interp = CoefInterpolator::new(&[4], 1, &LINE).unwrap();
        assert_eq!(interp.coefficients(&[-1], &[123_456])[0], LINE[0]);
        assert_eq!(interp.coefficients(&[-100], &[u32::MAX])[0], LINE[0]);
    }

    #[test]
    fn large_coordinate_clamps_to_last_entry() {
        let interp = CoefInterpolator::new(&[4], 1, &LINE).unwrap();
        assert_eq!(interp.coefficients(&[3], &[1 << 31])[0], LINE[3]);
        assert_eq!(interp.coefficients(&[1000], &[u32::MAX])[0], LINE[3]);
    }

    #[test]
    fn bilinear_blend() {
        let interp = CoefInterpolator::new(&[2, 3], 2, &GRID).unwrap();
        let out = interp.coefficients(&[0, 0], &[1 << 31, 1 << 31]);
        // Corners: (0,10) (100,20) (1000,40) (1100,50)
        assert_eq!(&out[..2], &[550, 30]);

        let out = interp.coefficients(&[1, 1], &[0, 1 << 31]);
        assert_eq!(&out[..2], &[1150, 55]);
    }

    #[test]
    fn clamping_is_per_dimension() {
        let interp = CoefInterpolator::new(&[2, 3], 2, &GRID).unwrap();
        let clamped = interp.coefficients(&[-1, 5], &[1 << 31, 1 << 31]);
        assert_eq!(&clamped[..2], &[200, 30]);
        let clamped = interp.coefficients(&[7, 0], &[1 << 31, 1 << 31]);
        assert_eq!(&clamped[..2], &[1050, 45]);
    }
}
