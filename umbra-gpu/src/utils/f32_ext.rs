pub trait F32Ext
where
    Self: Sized,
{
    fn saturate(self) -> Self;

    /// Wraps an angle (in radians) into `<0, 2*PI)`.
    fn wrap_angle(self) -> Self;
}

impl F32Ext for f32 {
    fn saturate(self) -> Self {
        self.clamp(0.0, 1.0)
    }

    fn wrap_angle(self) -> Self {
        const TAU: f32 = 2.0 * core::f32::consts::PI;

        let angle = self % TAU;

        if angle < 0.0 {
            angle + TAU
        } else {
            angle
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use core::f32::consts::PI;

    use super::*;

    #[test]
    fn wrap_angle() {
        assert_relative_eq!(0.5, 0.5_f32.wrap_angle());
        assert_relative_eq!(1.5 * PI, (-0.5 * PI).wrap_angle());
        assert_relative_eq!(0.5 * PI, (4.5 * PI).wrap_angle(), epsilon = 1e-5);
    }
}
