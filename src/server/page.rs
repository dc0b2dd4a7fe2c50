//! Static test page

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>AI Station</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body { font-family: sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; background: #f0f2f5; }
        .container { background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        input, select, button, textarea { padding: 10px; margin: 5px 0; width: 100%; box-sizing: border-box; }
        button { background: #007bff; color: white; border: none; cursor: pointer; border-radius: 5px; }
        button:hover { background: #0056b3; }
        #result-img { max-width: 100%; margin-top: 10px; border-radius: 5px; display: none; }
        .loading { color: #666; font-style: italic; display: none; }
        .error { color: red; display: none; }
        #chat-result { white-space: pre-wrap; }
    </style>
</head>
<body>
    <div class="container">
        <h1>AI Image Generation</h1>
        <p id="status">Checking station status...</p>

        <select id="model"></select>
        <input type="text" id="prompt" placeholder="Prompt (e.g. A futuristic city in cyberpunk style)" value="A cute robot holding a flower, high quality">
        <button onclick="generateImage()">Generate</button>

        <p id="loading" class="loading">Generating, please wait... (cold starts can take a while)</p>
        <p id="error" class="error"></p>
        <img id="result-img" alt="Generated Image" />

        <hr style="margin: 30px 0;">

        <h3>Chat</h3>
        <textarea id="chat-prompt" rows="3" placeholder="Ask something"></textarea>
        <button onclick="sendChat()">Send</button>
        <p id="chat-loading" class="loading">Waiting for reply...</p>
        <p id="chat-error" class="error"></p>
        <p id="chat-result"></p>
    </div>

    <script>
        async function loadInfo() {
            const status = document.getElementById('status');
            const select = document.getElementById('model');
            try {
                const response = await fetch('/api/info');
                const info = await response.json();
                for (const key of info.models) {
                    const option = document.createElement('option');
                    option.value = key;
                    option.textContent = key;
                    select.appendChild(option);
                }
                status.innerText = info.token_set
                    ? 'Station online'
                    : 'Station online, but HF_TOKEN is not configured';
            } catch (e) {
                status.innerText = 'Station unreachable: ' + e.message;
            }
        }

        async function generateImage() {
            const prompt = document.getElementById('prompt').value;
            const model = document.getElementById('model').value;
            const img = document.getElementById('result-img');
            const loading = document.getElementById('loading');
            const error = document.getElementById('error');

            if (!prompt) return alert("Please enter a prompt");

            img.style.display = 'none';
            error.style.display = 'none';
            loading.style.display = 'block';

            try {
                const query = `prompt=${encodeURIComponent(prompt)}&model=${encodeURIComponent(model)}`;
                const response = await fetch(`/api/generate-image?${query}`);
                if (!response.ok) throw new Error(await response.text());

                const blob = await response.blob();
                img.src = URL.createObjectURL(blob);
                img.style.display = 'block';
            } catch (e) {
                error.innerText = "Generation failed: " + e.message;
                error.style.display = 'block';
            } finally {
                loading.style.display = 'none';
            }
        }

        async function sendChat() {
            const prompt = document.getElementById('chat-prompt').value;
            const result = document.getElementById('chat-result');
            const loading = document.getElementById('chat-loading');
            const error = document.getElementById('chat-error');

            if (!prompt) return;

            result.innerText = '';
            error.style.display = 'none';
            loading.style.display = 'block';

            try {
                const response = await fetch(`/api/chat?prompt=${encodeURIComponent(prompt)}`, { method: 'POST' });
                if (!response.ok) throw new Error(await response.text());
                const body = await response.json();
                result.innerText = body.result;
            } catch (e) {
                error.innerText = "Chat failed: " + e.message;
                error.style.display = 'block';
            } finally {
                loading.style.display = 'none';
            }
        }

        loadInfo();
    </script>
</body>
</html>
"#;
