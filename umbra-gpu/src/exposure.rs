/// Table of minutes (over a day) the sun spends in each azimuth bucket above
/// each horizon level.
///
/// `minutes_above(bucket, level)` is non-increasing in `level`.
pub trait ExposureTable {
    fn buckets(&self) -> u32;
    fn levels(&self) -> u32;
    fn minutes_above(&self, bucket: u32, level: u32) -> f32;
}

/// Exposure table stored as a flat, bucket-major array; this is how the table
/// gets uploaded for consuming shaders.
#[derive(Clone, Copy)]
pub struct ExposureSlice<'a> {
    data: &'a [f32],
    buckets: u32,
    levels: u32,
}

impl<'a> ExposureSlice<'a> {
    pub fn new(data: &'a [f32], buckets: u32, levels: u32) -> Self {
        Self {
            data,
            buckets,
            levels,
        }
    }
}

impl ExposureTable for ExposureSlice<'_> {
    fn buckets(&self) -> u32 {
        self.buckets
    }

    fn levels(&self) -> u32 {
        self.levels
    }

    fn minutes_above(&self, bucket: u32, level: u32) -> f32 {
        self.data[(bucket * self.levels + level) as usize]
    }
}

/// Returns for how many minutes a texel is sunlit, given its horizon level in
/// each bucket (as stored in its horizon table).
///
/// Sun counts as visible in a bucket once its level reaches the horizon's, so
/// an open horizon (level 0) sees the whole day.
pub fn sunlit_minutes<T>(table: &T, horizon_level: impl Fn(u32) -> u32) -> f32
where
    T: ExposureTable,
{
    let levels = table.levels();
    let mut minutes = 0.0;
    let mut bucket = 0;

    while bucket < table.buckets() {
        let level = horizon_level(bucket);

        if level < levels {
            minutes += table.minutes_above(bucket, level);
        }

        bucket += 1;
    }

    minutes
}
