use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TranslitModelConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
    pub pad_id:      usize,
}

impl TranslitModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TranslitModel<B> {
        // Source and target share one vocabulary, so one token
        // embedding serves both sides.
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let encoder: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let decoder: Vec<DecoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_decoder_block(device))
            .collect();
        let encoder_norm = LayerNormConfig::new(self.d_model).init(device);
        let decoder_norm = LayerNormConfig::new(self.d_model).init(device);
        let lm_head      = LinearConfig::new(self.d_model, self.vocab_size).init(device);
        let dropout      = DropoutConfig::new(self.dropout).init();
        TranslitModel {
            token_embedding, position_embedding,
            encoder, decoder,
            encoder_norm, decoder_norm, lm_head, dropout,
            max_seq_len: self.max_seq_len,
            pad_id:      self.pad_id,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }

    fn build_decoder_block<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let cross_attn  = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let norm3   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        DecoderBlock { self_attn, cross_attn, ffn_linear1, ffn_linear2, norm1, norm2, norm3, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self.self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(pad_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub cross_attn:  MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub norm3:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    /// x:      [batch, tgt_len, d_model] decoder stream
    /// memory: [batch, src_len, d_model] encoder output
    pub fn forward(
        &self,
        x:            Tensor<B, 3>,
        memory:       Tensor<B, 3>,
        causal_mask:  Tensor<B, 3, Bool>,
        mem_pad_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        // Causal self-attention — position t may only see positions <= t
        let attn_output = self.self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_attn(causal_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));

        // Cross-attention — queries from the decoder, keys/values from
        // the encoder memory, with source padding masked out
        let cross_output = self.cross_attn
            .forward(MhaInput::new(x.clone(), memory.clone(), memory).mask_pad(mem_pad_mask))
            .context;
        let x = self.norm2.forward(x + self.dropout.forward(cross_output));

        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm3.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TranslitModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub encoder:            Vec<EncoderBlock<B>>,
    pub decoder:            Vec<DecoderBlock<B>>,
    pub encoder_norm:       LayerNorm<B>,
    pub decoder_norm:       LayerNorm<B>,
    pub lm_head:            Linear<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
    pub pad_id:             usize,
}

impl<B: Backend> TranslitModel<B> {
    /// Token + position embedding for one sequence of ids.
    fn embed(&self, ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = ids.dims();
        let tok_emb = self.token_embedding.forward(ids);

        // Self-attention is permutation-invariant, so position must be
        // injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        self.dropout.forward(tok_emb + pos_emb)
    }

    /// source_ids: [batch, src_len] → encoder memory [batch, src_len, d_model]
    pub fn encode(
        &self,
        source_ids:   Tensor<B, 2, Int>,
        src_pad_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let mut x = self.embed(source_ids);
        for block in &self.encoder {
            x = block.forward(x, src_pad_mask.clone());
        }
        self.encoder_norm.forward(x)
    }

    /// decoder_input: [batch, tgt_len] → logits [batch, tgt_len, vocab]
    pub fn decode(
        &self,
        decoder_input: Tensor<B, 2, Int>,
        memory:        Tensor<B, 3>,
        src_pad_mask:  Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let [batch_size, tgt_len] = decoder_input.dims();
        let causal = generate_autoregressive_mask::<B>(batch_size, tgt_len, &memory.device());

        let mut x = self.embed(decoder_input);
        for block in &self.decoder {
            x = block.forward(x, memory.clone(), causal.clone(), src_pad_mask.clone());
        }
        let x = self.decoder_norm.forward(x); // [batch, tgt_len, d_model]

        self.lm_head.forward(x) // [batch, tgt_len, vocab]
    }

    /// Full teacher-forced forward pass.
    pub fn forward(
        &self,
        source_ids:    Tensor<B, 2, Int>,
        src_pad_mask:  Tensor<B, 2, Bool>,
        decoder_input: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let memory = self.encode(source_ids, src_pad_mask.clone());
        self.decode(decoder_input, memory, src_pad_mask)
    }

    /// Forward pass + token-level cross-entropy against `labels`.
    /// [PAD] label positions are excluded from the loss.
    pub fn forward_loss(
        &self,
        source_ids:    Tensor<B, 2, Int>,
        src_pad_mask:  Tensor<B, 2, Bool>,
        decoder_input: Tensor<B, 2, Int>,
        labels:        Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let logits = self.forward(source_ids, src_pad_mask, decoder_input);
        let [batch_size, tgt_len, vocab] = logits.dims();

        let flat_logits = logits.clone().reshape([batch_size * tgt_len, vocab]);
        let flat_labels = labels.reshape([batch_size * tgt_len]);

        let ce = burn::nn::loss::CrossEntropyLossConfig::new()
            .with_pad_tokens(Some(vec![self.pad_id]))
            .init(&flat_logits.device());
        let loss = ce.forward(flat_logits, flat_labels);

        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn tiny_config() -> TranslitModelConfig {
        TranslitModelConfig::new(32, 16, 8, 2, 1, 16, 0.0, 0)
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: TranslitModel<TestBackend> = tiny_config().init(&device);

        let source = Tensor::<TestBackend, 1, Int>::from_ints(
            [4, 5, 6, 0].as_slice(), &device
        ).reshape([1, 4]);
        let pad_mask = source.clone().equal_elem(0);
        let dec_in = Tensor::<TestBackend, 1, Int>::from_ints(
            [2, 7, 8].as_slice(), &device
        ).reshape([1, 3]);

        let logits = model.forward(source, pad_mask, dec_in);
        assert_eq!(logits.dims(), [1, 3, 32]);
    }

    #[test]
    fn test_loss_is_finite() {
        let device = Default::default();
        let model: TranslitModel<TestBackend> = tiny_config().init(&device);

        let source = Tensor::<TestBackend, 1, Int>::from_ints(
            [4, 5].as_slice(), &device
        ).reshape([1, 2]);
        let pad_mask = source.clone().equal_elem(0);
        let dec_in = Tensor::<TestBackend, 1, Int>::from_ints(
            [2, 7].as_slice(), &device
        ).reshape([1, 2]);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints(
            [7, 3].as_slice(), &device
        ).reshape([1, 2]);

        let (loss, logits) = model.forward_loss(source, pad_mask, dec_in, labels);
        assert_eq!(logits.dims(), [1, 2, 32]);
        let value: f64 = loss.into_scalar().elem();
        assert!(value.is_finite());
    }
}
