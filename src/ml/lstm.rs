// ============================================================
// Layer 5 — Dynamic (masked, reversible) LSTM
// ============================================================
// Burn's built-in Lstm projects its own input and has neither
// peepholes nor padding awareness. This layer runs over inputs
// that are ALREADY projected to the four gate pre-activations
// (the preceding Linear does that), so input width = 4 * hidden.
//
// Gate layout along the feature axis: candidate, input, forget,
// output. The bias vector carries the 4 gate biases followed by
// the three peephole weights:
//
//   bias = [ b_c | b_i | b_f | b_o | w_ic | w_fc | w_oc ]   (7 * hidden)
//
//   i  = σ(x_i + W_i h + b_i + w_ic ⊙ c_prev)
//   f  = σ(x_f + W_f h + b_f + w_fc ⊙ c_prev)
//   c  = f ⊙ c_prev + i ⊙ tanh(x_c + W_c h + b_c)
//   o  = σ(x_o + W_o h + b_o + w_oc ⊙ c)
//   h  = o ⊙ tanh(c)
//
// A padded step (mask = 0) keeps h and c unchanged and emits 0,
// so right-padded sequences yield the same outputs as running
// each sequence alone, in either direction.

use burn::{
    module::Param,
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::sigmoid,
};

const NUM_GATES: usize = 4;
const NUM_PEEPHOLES: usize = 3;

#[derive(Config, Debug)]
pub struct DynamicLstmConfig {
    /// Hidden / cell width
    pub d_hidden: usize,
}

impl DynamicLstmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DynamicLstm<B> {
        let h = self.d_hidden;
        let recurrent = LinearConfig::new(h, NUM_GATES * h)
            .with_bias(false)
            .with_initializer(Initializer::XavierUniform { gain: 1.0 })
            .init(device);
        let bias = Param::from_tensor(Tensor::zeros([(NUM_GATES + NUM_PEEPHOLES) * h], device));

        DynamicLstm { recurrent, bias, d_hidden: h }
    }
}

#[derive(Module, Debug)]
pub struct DynamicLstm<B: Backend> {
    /// Hidden-to-gates weight [hidden, 4 * hidden]
    pub recurrent: Linear<B>,
    /// Gate biases and peephole weights [7 * hidden]
    pub bias:      Param<Tensor<B, 1>>,
    pub d_hidden:  usize,
}

impl<B: Backend> DynamicLstm<B> {
    /// gates_x: [batch, seq_len, 4 * hidden], mask: [batch, seq_len]
    /// → hidden states [batch, seq_len, hidden]
    pub fn forward(&self, gates_x: Tensor<B, 3>, mask: Tensor<B, 2>, reverse: bool) -> Tensor<B, 3> {
        let [batch, seq_len, width] = gates_x.dims();
        let h = self.d_hidden;
        let device = gates_x.device();

        let bias = self.bias.val();
        let gate_bias = bias.clone().slice([0..NUM_GATES * h]).unsqueeze::<2>();
        let peep_i    = bias.clone().slice([4 * h..5 * h]).unsqueeze::<2>();
        let peep_f    = bias.clone().slice([5 * h..6 * h]).unsqueeze::<2>();
        let peep_o    = bias.slice([6 * h..7 * h]).unsqueeze::<2>();

        let mut hidden = Tensor::<B, 2>::zeros([batch, h], &device);
        let mut cell   = Tensor::<B, 2>::zeros([batch, h], &device);
        let mut outputs = Vec::with_capacity(seq_len);

        let steps: Vec<usize> = if reverse {
            (0..seq_len).rev().collect()
        } else {
            (0..seq_len).collect()
        };

        for t in steps {
            let x_t = gates_x
                .clone()
                .slice([0..batch, t..t + 1, 0..width])
                .reshape([batch, width]);
            let live = mask.clone().slice([0..batch, t..t + 1]); // [batch, 1]
            let idle = live.clone().neg().add_scalar(1.0);

            let gates = x_t + self.recurrent.forward(hidden.clone()) + gate_bias.clone();

            let candidate = gates.clone().slice([0..batch, 0..h]).tanh();
            let input = sigmoid(
                gates.clone().slice([0..batch, h..2 * h]) + cell.clone() * peep_i.clone(),
            );
            let forget = sigmoid(
                gates.clone().slice([0..batch, 2 * h..3 * h]) + cell.clone() * peep_f.clone(),
            );
            let cell_next = forget * cell.clone() + input * candidate;
            let output = sigmoid(
                gates.slice([0..batch, 3 * h..4 * h]) + cell_next.clone() * peep_o.clone(),
            );
            let hidden_next = output * cell_next.clone().tanh();

            cell   = cell_next * live.clone() + cell * idle.clone();
            hidden = hidden_next.clone() * live.clone() + hidden * idle;
            outputs.push(hidden_next * live);
        }

        if reverse {
            outputs.reverse();
        }
        Tensor::stack(outputs, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::{Distribution, TensorData};

    type TestBackend = NdArray;

    fn assert_close(a: Tensor<TestBackend, 3>, b: Tensor<TestBackend, 3>) {
        let a: Vec<f32> = a.into_data().to_vec().unwrap();
        let b: Vec<f32> = b.into_data().to_vec().unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5, "{x} != {y}");
        }
    }

    fn setup(seq_len: usize) -> (DynamicLstm<TestBackend>, Tensor<TestBackend, 3>) {
        let device = NdArrayDevice::Cpu;
        let lstm = DynamicLstmConfig::new(3).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random(
            [1, seq_len, 12],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        (lstm, x)
    }

    #[test]
    fn test_output_shape() {
        let (lstm, x) = setup(5);
        let mask = Tensor::<TestBackend, 2>::ones([1, 5], &NdArrayDevice::Cpu);
        assert_eq!(lstm.forward(x, mask, false).dims(), [1, 5, 3]);
    }

    #[test]
    fn test_padding_does_not_change_real_steps() {
        for reverse in [false, true] {
            let device = NdArrayDevice::Cpu;
            let (lstm, x) = setup(3);
            let unpadded = lstm.forward(
                x.clone(),
                Tensor::ones([1, 3], &device),
                reverse,
            );

            // same sequence followed by two padding steps
            let padded_x = Tensor::cat(vec![x, Tensor::ones([1, 2, 12], &device)], 1);
            let mask = Tensor::<TestBackend, 2>::from_data(
                TensorData::new(vec![1.0f32, 1.0, 1.0, 0.0, 0.0], [1, 5]),
                &device,
            );
            let padded = lstm.forward(padded_x, mask, reverse);

            assert_close(padded.clone().slice([0..1, 0..3, 0..3]), unpadded);
            let tail: Vec<f32> = padded.slice([0..1, 3..5, 0..3]).into_data().to_vec().unwrap();
            assert!(tail.iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_reverse_reads_last_step_first() {
        let device = NdArrayDevice::Cpu;
        let (lstm, x) = setup(4);
        let ones = Tensor::<TestBackend, 2>::ones([1, 4], &device);

        // the last output of a reversed run sees only the last input,
        // like the first output of a forward run over the last step
        let reversed = lstm.forward(x.clone(), ones, true);
        let last_only = lstm.forward(
            x.slice([0..1, 3..4, 0..12]),
            Tensor::ones([1, 1], &device),
            false,
        );
        assert_close(reversed.slice([0..1, 3..4, 0..3]), last_only);
    }
}
