//! The trip form page
//!
//! A single self-contained HTML document. It submits the form over the
//! `/api/plan/ws` WebSocket and applies incoming notifications: the status
//! widget, toasts, the progress region and the final plan.

use chrono::NaiveDate;
use trippy_core::trip::DATE_FORMAT;
use trippy_core::DateRange;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Trippy Tales: Your AI Travel Planner</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #1a1a2e;
            color: #eee;
            margin: 0;
            display: flex;
            min-height: 100vh;
        }
        aside {
            width: 320px;
            background: #16213e;
            padding: 1.5rem;
            box-sizing: border-box;
        }
        main {
            flex: 1;
            padding: 1.5rem 2rem;
            overflow: auto;
        }
        h1 { color: #00d4ff; margin-top: 0; }
        h2 { margin-top: 0; }
        .icon { font-size: 72px; }
        .intro { color: #aab; }
        label { display: block; margin-top: 1rem; font-size: 0.9rem; }
        fieldset {
            border: none;
            padding: 0;
            margin: 1rem 0 0;
            font-size: 0.9rem;
        }
        fieldset label { margin-top: 0.3rem; }
        input, textarea {
            width: 100%;
            box-sizing: border-box;
            margin-top: 0.3rem;
            padding: 0.5rem;
            background: #0f3460;
            color: #eee;
            border: 1px solid #1f4f8a;
            border-radius: 4px;
        }
        button {
            margin-top: 1.5rem;
            width: 100%;
            padding: 0.7rem;
            background: #00d4ff;
            color: #1a1a2e;
            border: none;
            border-radius: 4px;
            font-weight: bold;
            cursor: pointer;
        }
        button:disabled { opacity: 0.5; cursor: wait; }
        #status { margin-bottom: 1rem; color: #4ade80; }
        #status.error { color: #f87171; }
        #progress {
            max-height: 45vh;
            overflow-y: auto;
            background: #16213e;
            border-radius: 8px;
            padding: 0 1rem;
            white-space: pre-wrap;
            font-family: ui-monospace, Menlo, monospace;
            font-size: 0.85rem;
        }
        #plan-heading {
            margin-top: 1.5rem;
            padding-bottom: 0.4rem;
            border-bottom: 3px solid;
            border-image: linear-gradient(90deg, #f87171, #facc15, #4ade80, #00d4ff, #a78bfa) 1;
        }
        #plan { margin-top: 1rem; }
        #error { color: #f87171; margin-top: 1rem; }
        #toasts {
            position: fixed;
            right: 1rem;
            bottom: 1rem;
        }
        .toast {
            background: #0f3460;
            padding: 0.6rem 1rem;
            margin-top: 0.5rem;
            border-radius: 6px;
        }
    </style>
</head>
<body>
    <aside>
        <h2>🧳 Trip Preferences</h2>
        <form id="trip">
            <label>🌍 Your Current Location
                <input name="origin" placeholder="San Mateo, CA">
            </label>
            <label>📍 Desired Destination
                <input name="destination" placeholder="Bali, Indonesia">
            </label>
            <fieldset>
                <legend>📅 Travel Dates</legend>
                <label>From
                    <input type="date" name="date_start" value="{{DATE_START}}" min="{{DATE_MIN}}">
                </label>
                <label>To
                    <input type="date" name="date_end" value="{{DATE_END}}" min="{{DATE_MIN}}">
                </label>
            </fieldset>
            <label>🧠 Interests &amp; Details
                <textarea name="interests" rows="4"
                    placeholder="2 adults who love swimming, hiking, food..."></textarea>
            </label>
            <button type="submit">✈️ Plan My Trip</button>
        </form>
    </aside>
    <main>
        <div class="icon">🚀🌄</div>
        <h1>Trippy Tales: Your AI Travel Planner</h1>
        <p class="intro">Your personal AI assistant is ready to create the ultimate trip plan based on your preferences.</p>
        <div id="status"></div>
        <div id="progress"></div>
        <div id="error"></div>
        <h3 id="plan-heading" hidden>🗺️ Here’s your personalized travel plan</h3>
        <div id="plan"></div>
    </main>
    <div id="toasts"></div>
    <script>
        const form = document.getElementById('trip');
        const button = form.querySelector('button');
        const statusEl = document.getElementById('status');
        const progressEl = document.getElementById('progress');
        const errorEl = document.getElementById('error');
        const planEl = document.getElementById('plan');
        const planHeadingEl = document.getElementById('plan-heading');
        const toastsEl = document.getElementById('toasts');

        const proto = location.protocol === 'https:' ? 'wss' : 'ws';
        const socket = new WebSocket(`${proto}://${location.host}/api/plan/ws`);

        function toast(message) {
            const el = document.createElement('div');
            el.className = 'toast';
            el.textContent = message;
            toastsEl.appendChild(el);
            setTimeout(() => el.remove(), 4000);
        }

        socket.onmessage = (event) => {
            const n = JSON.parse(event.data);
            switch (n.type) {
                case 'Status':
                    statusEl.textContent = n.label;
                    statusEl.className = n.state === 'error' ? 'error' : '';
                    button.disabled = n.state === 'running';
                    break;
                case 'Toast':
                    toast(n.message);
                    break;
                case 'Progress':
                    progressEl.innerHTML = n.html;
                    progressEl.scrollTop = progressEl.scrollHeight;
                    break;
                case 'Completed':
                    planHeadingEl.hidden = false;
                    planEl.innerHTML = n.html;
                    break;
                case 'Failed':
                    errorEl.textContent = n.message;
                    break;
            }
        };

        form.addEventListener('submit', (event) => {
            event.preventDefault();
            const data = Object.fromEntries(new FormData(form));
            progressEl.innerHTML = '';
            errorEl.textContent = '';
            planEl.innerHTML = '';
            planHeadingEl.hidden = true;
            socket.send(JSON.stringify({ type: 'Submit', ...data }));
        });
    </script>
</body>
</html>
"#;

/// Render the page with the form's date defaults for `today`
pub fn render(today: NaiveDate) -> String {
    let dates = DateRange::default_from(today);
    let fmt = |d: NaiveDate| d.format(DATE_FORMAT).to_string();
    TEMPLATE
        .replace("{{DATE_START}}", &fmt(dates.start))
        .replace("{{DATE_END}}", &fmt(dates.end))
        .replace("{{DATE_MIN}}", &fmt(today))
}
