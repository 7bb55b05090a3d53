use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::error::PbdError;
use crate::math::{Matrix3, Vector3, EPSILON};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Hyperelastic material model for tetrahedral FEM constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum FemMaterialType {
    /// Linearized elasticity; not usable with the position solver
    Linear,
    /// Corotational elasticity via polar decomposition
    Corotation,
    /// Saint Venant-Kirchhoff
    StVK,
    /// Compressible Neo-Hookean
    NeoHookean,
}

/// Strain-energy constraint over one tetrahedron
///
/// The constraint function is the elastic energy density of the chosen
/// material model scaled by the rest volume, with gradients derived from
/// the first Piola-Kirchhoff stress.
#[derive(Debug, Clone)]
pub struct FemTetConstraint {
    body: BodyHandle,
    ids: [usize; 4],
    material: FemMaterialType,
    /// First Lame parameter (shear)
    mu: f64,
    /// Second Lame parameter (compressibility)
    lame_lambda: f64,
    rest_volume: f64,
    inv_rest_mat: Matrix3,
}

impl FemTetConstraint {
    /// Creates the constraint, inverting the rest edge matrix
    ///
    /// Fails for the `Linear` material, which has no energy form the
    /// position solver can project, and for flat rest tetrahedra.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        handle: BodyHandle,
        body: &Body,
        i1: usize,
        i2: usize,
        i3: usize,
        i4: usize,
        material: FemMaterialType,
        mu: f64,
        lame_lambda: f64,
    ) -> Result<Self> {
        if material == FemMaterialType::Linear {
            return Err(PbdError::InvalidConfiguration(
                "the linear FEM material is not supported by the position solver".to_string(),
            ));
        }

        let p0 = body.initial_vertex_position(i1);
        let p1 = body.initial_vertex_position(i2);
        let p2 = body.initial_vertex_position(i3);
        let p3 = body.initial_vertex_position(i4);

        let rest_volume = (1.0 / 6.0) * (p3 - p0).dot(&(p1 - p0).cross(&(p2 - p0)));

        let m = Matrix3::from_cols(p0 - p3, p1 - p3, p2 - p3);
        if m.determinant().abs() <= EPSILON {
            return Err(PbdError::DegenerateGeometry(format!(
                "FEM constraint over flat rest tetrahedron {} {} {} {}",
                i1, i2, i3, i4
            )));
        }
        // determinant checked above
        let inv_rest_mat = m.inverse().unwrap_or_else(Matrix3::identity);

        Ok(Self {
            body: handle,
            ids: [i1, i2, i3, i4],
            material,
            mu,
            lame_lambda,
            rest_volume,
            inv_rest_mat,
        })
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn material(&self) -> FemMaterialType {
        self.material
    }

    /// Evaluates the energy and stress of the material at deformation gradient `f`
    ///
    /// Returns `None` in configurations where the model is undefined, such
    /// as inverted elements under Neo-Hookean.
    fn evaluate(&self, f: &Matrix3) -> Option<(f64, Matrix3)> {
        let mu = self.mu;
        let lambda = self.lame_lambda;

        match self.material {
            FemMaterialType::StVK => {
                // E = (F^T F - I) / 2
                let ft_f = f.transpose().multiply_matrix(f);
                let e = (ft_f - Matrix3::identity()) * 0.5;
                let tr = e.trace();

                // P = F (2 mu E + lambda tr(E) I)
                let mut stress = e * (2.0 * mu);
                for k in 0..3 {
                    stress.data[k][k] += lambda * tr;
                }
                let p = f.multiply_matrix(&stress);

                let c = mu * e.frobenius_norm_squared() + 0.5 * lambda * tr * tr;
                Some((c, p))
            }
            FemMaterialType::Corotation => {
                let (u, sigma, v_t) = f.svd();
                if sigma.x.abs() < EPSILON || sigma.y.abs() < EPSILON || sigma.z.abs() < EPSILON {
                    return None;
                }

                let r = u.multiply_matrix(&v_t);
                let inv_f_t = Matrix3::from_cols(
                    u.col(0) / sigma.x,
                    u.col(1) / sigma.y,
                    u.col(2) / sigma.z,
                )
                .multiply_matrix(&v_t);
                let j = sigma.x * sigma.y * sigma.z;

                let fr = *f - r;
                let p = fr * (2.0 * mu) + inv_f_t * (lambda * (j - 1.0) * j);
                let c = mu * fr.frobenius_norm_squared() + 0.5 * lambda * (j - 1.0) * (j - 1.0);
                Some((c, p))
            }
            FemMaterialType::NeoHookean => {
                let det = f.determinant();
                if det <= EPSILON {
                    // inverted or collapsed element, log(J) undefined
                    return None;
                }
                let inv_f_t = f.inverse()?.transpose();
                let log_j = det.ln();

                let p = (*f - inv_f_t) * mu + inv_f_t * (lambda * log_j);
                let c = 0.5 * mu * (f.frobenius_norm_squared() - 3.0) - mu * log_j
                    + 0.5 * lambda * log_j * log_j;
                Some((c, p))
            }
            FemMaterialType::Linear => None,
        }
    }

    /// Projects the four vertices down the energy gradient
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let [i0, i1, i2, i3] = self.ids;

        let (p0, p1, p2, p3, w) = {
            let body = match bodies.get_body(self.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(i0),
                body.vertex_position(i1),
                body.vertex_position(i2),
                body.vertex_position(i3),
                [
                    body.inv_mass(i0),
                    body.inv_mass(i1),
                    body.inv_mass(i2),
                    body.inv_mass(i3),
                ],
            )
        };

        let m = Matrix3::from_cols(p0 - p3, p1 - p3, p2 - p3);
        let f = m.multiply_matrix(&self.inv_rest_mat);

        let (c, p) = match self.evaluate(&f) {
            Some(result) => result,
            None => return false,
        };

        let grad_c = p.multiply_matrix(&self.inv_rest_mat.transpose()) * self.rest_volume;
        let g0 = grad_c.col(0);
        let g1 = grad_c.col(1);
        let g2 = grad_c.col(2);
        let g3: Vector3 = g0 + g1 + g2;

        let sum = w[0] * g0.length_squared()
            + w[1] * g1.length_squared()
            + w[2] * g2.length_squared()
            + w[3] * g3.length_squared();
        if sum < EPSILON {
            return false;
        }

        let s = c * self.rest_volume / sum;

        if let Ok(body) = bodies.get_body_mut(self.body) {
            if w[0] > 0.0 {
                body.displace_vertex(i0, g0 * (-s * w[0]));
            }
            if w[1] > 0.0 {
                body.displace_vertex(i1, g1 * (-s * w[1]));
            }
            if w[2] > 0.0 {
                body.displace_vertex(i2, g2 * (-s * w[2]));
            }
            if w[3] > 0.0 {
                // the fourth gradient is minus the sum of the others
                body.displace_vertex(i3, g3 * (s * w[3]));
            }
        }

        true
    }
}
