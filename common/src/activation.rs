/// The possible activation functions applied to the reservoir state transition
#[derive(Debug, Clone, Copy)]
pub enum Activation {
    /// The identity function
    Identity,
    /// The hyperbolic tangent
    Tanh,
    /// The rectified linear unit
    Relu,
}

impl Activation {
    /// Perform the activation function over all elements
    pub fn activate(&self, vals: &mut [f64]) {
        match self {
            Activation::Identity => {}
            Activation::Tanh => {
                for v in vals {
                    *v = v.tanh();
                }
            }
            Activation::Relu => {
                for v in vals {
                    if *v < 0.0 {
                        *v = 0.0;
                    }
                }
            }
        }
    }

    /// Evaluate the derivative of the activation function over all elements
    pub fn derivative(&self, vals: &mut [f64]) {
        match self {
            Activation::Identity => {
                for v in vals {
                    *v = 1.0;
                }
            }
            Activation::Tanh => {
                for v in vals {
                    let t = v.tanh();
                    *v = 1.0 - t * t;
                }
            }
            Activation::Relu => {
                for v in vals {
                    *v = if *v > 0.0 {
                        1.0
                    } else {
                        0.0
                    };
                }
            }
        }
    }
}
